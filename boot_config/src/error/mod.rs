//! Error types produced while loading and composing boot fragments.

mod aggregate;
mod constructors;
mod types;

pub use aggregate::{AggregatedErrors, SessionFailure};
pub use types::BootError;

/// Result alias used throughout the crate.
///
/// Errors are shared behind an [`Arc`](std::sync::Arc) so that failures from
/// independent sessions can be gathered into [`BootError::Aggregate`] without
/// cloning their payloads.
pub type BootResult<T> = Result<T, std::sync::Arc<BootError>>;

#[cfg(test)]
mod tests;
