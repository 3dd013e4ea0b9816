//! Failures collected from sessions resolved side by side.

use std::fmt;
use std::sync::Arc;

use super::BootError;

/// One failed session: the root it was resolving and why it failed.
#[derive(Debug, Clone)]
pub struct SessionFailure {
    root: String,
    error: Arc<BootError>,
}

impl SessionFailure {
    /// Records that resolving `root` failed with `error`.
    #[must_use]
    pub fn new(root: impl Into<String>, error: Arc<BootError>) -> Self {
        Self {
            root: root.into(),
            error,
        }
    }

    /// Root document of the failed session.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The error that ended the session.
    #[must_use]
    pub fn error(&self) -> &BootError {
        &self.error
    }

    /// Consumes the record, keeping only the error.
    #[must_use]
    pub fn into_error(self) -> Arc<BootError> {
        self.error
    }
}

/// Every failure of a [`Composer::resolve_all`](crate::Composer::resolve_all)
/// call, in request order.
///
/// # Examples
///
/// ```
/// use boot_config::{BootError, SessionFailure};
///
/// let err = BootError::from_sessions(vec![
///     SessionFailure::new("a.js", BootError::not_found("a.js", None)),
///     SessionFailure::new("b.js", BootError::not_found("b.js", None)),
/// ]);
/// let Some(BootError::Aggregate(failures)) = err.as_deref() else {
///     panic!("two failures aggregate");
/// };
/// let roots: Vec<&str> = failures.iter().map(|failure| failure.root()).collect();
/// assert_eq!(roots, ["a.js", "b.js"]);
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors {
    failures: Vec<SessionFailure>,
}

impl AggregatedErrors {
    /// Wraps already collected failures.
    #[must_use]
    pub const fn new(failures: Vec<SessionFailure>) -> Self {
        Self { failures }
    }

    /// Failed sessions in request order.
    pub fn iter(&self) -> std::slice::Iter<'_, SessionFailure> {
        self.failures.iter()
    }

    /// The errors alone, without their roots.
    pub fn errors(&self) -> impl Iterator<Item = &BootError> {
        self.failures.iter().map(SessionFailure::error)
    }

    /// Number of failed sessions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no session failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.failures.iter().enumerate().peekable();
        while let Some((index, failure)) = lines.next() {
            write!(f, "  {}. {}: {}", index + 1, failure.root, failure.error)?;
            if lines.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a AggregatedErrors {
    type Item = &'a SessionFailure;
    type IntoIter = std::slice::Iter<'a, SessionFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
