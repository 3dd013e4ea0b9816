//! Constructors for `BootError` variants.

use std::sync::Arc;

use super::{AggregatedErrors, BootError, SessionFailure};

impl BootError {
    /// Folds the failures of parallel sessions into one error.
    ///
    /// No failure yields `None`. A single failure is returned unchanged so
    /// callers see the same error as for a lone [`Composer::resolve`]
    /// call; several are wrapped in [`Self::Aggregate`].
    ///
    /// [`Composer::resolve`]: crate::Composer::resolve
    #[must_use]
    pub fn from_sessions(mut failures: Vec<SessionFailure>) -> Option<Arc<Self>> {
        if failures.len() > 1 {
            return Some(Arc::new(Self::Aggregate(Box::new(AggregatedErrors::new(
                failures,
            )))));
        }
        failures.pop().map(SessionFailure::into_error)
    }

    /// Builds a [`BootError::NotFound`] for `name`.
    #[must_use]
    pub fn not_found(name: impl Into<String>, referenced_from: Option<&str>) -> Arc<Self> {
        Arc::new(Self::NotFound {
            name: name.into(),
            referenced_from: referenced_from.map(str::to_owned),
        })
    }

    /// Builds a [`BootError::MalformedDocument`].
    #[must_use]
    pub fn malformed(
        document: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self::MalformedDocument {
            document: document.into(),
            location: location.into(),
            message: message.into(),
        })
    }

    /// Builds a [`BootError::CyclicReference`] from the chain of documents
    /// currently being resolved followed by the document that closes the loop.
    #[must_use]
    pub fn cycle<'a, I>(chain: I, closing: &str) -> Arc<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<&str> = chain.into_iter().collect();
        names.push(closing);
        Arc::new(Self::CyclicReference {
            cycle: names.join(" -> "),
        })
    }

    /// Wraps an I/O failure raised while reading `name`.
    #[must_use]
    pub fn store(name: impl Into<String>, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::Store {
            name: name.into(),
            source,
        })
    }
}
