//! Primary error enum for composition sessions.

use thiserror::Error;

use super::AggregatedErrors;

/// Errors that can occur while resolving a boot configuration.
///
/// Every variant is fatal to the session that raised it; composition never
/// returns partial documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootError {
    /// No document is registered under the requested name.
    #[error("document '{name}' not found{}", referenced_from_suffix(.referenced_from.as_deref()))]
    NotFound {
        /// Name as written in the request or the referencing directive.
        name: String,
        /// Document holding the reference, when there is one.
        referenced_from: Option<String>,
    },

    /// A document could not be parsed or contains a misplaced directive.
    #[error("malformed document '{document}' at {location}: {message}")]
    MalformedDocument {
        /// Canonical name of the faulty document.
        document: String,
        /// `line L, column C` for syntax errors, a tree breadcrumb otherwise.
        location: String,
        /// Human-readable description of the problem.
        message: String,
    },

    /// An `$include` pointer does not match any node.
    #[error(
        "include path '{reference}' in '{document}' at {location} does not resolve: {detail}"
    )]
    PathNotFound {
        /// Reference as written, for example `python-top.js#bundles[*]`.
        reference: String,
        /// Document holding the directive.
        document: String,
        /// Breadcrumb of the directive inside its document.
        location: String,
        /// Which pointer step failed.
        detail: String,
    },

    /// A `condition` expression could not be parsed.
    #[error(
        "invalid condition \"{expression}\" in '{document}' at {location}: {message} (offset {offset})"
    )]
    ConditionSyntax {
        /// Expression as written in the fragment.
        expression: String,
        /// Document holding the directive.
        document: String,
        /// Breadcrumb of the directive inside its document.
        location: String,
        /// Character offset of the failure within the expression.
        offset: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A document transitively merges or includes itself.
    #[error("cyclic reference detected: {cycle}")]
    CyclicReference {
        /// Chain of documents participating in the cycle.
        cycle: String,
    },

    /// A document store failed to read an existing document.
    #[error("failed to read document '{name}': {source}")]
    Store {
        /// Name of the document being read.
        name: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Several independent sessions failed.
    #[error("multiple composition errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}

fn referenced_from_suffix(referenced_from: Option<&str>) -> String {
    referenced_from.map_or_else(String::new, |from| format!(" (referenced from '{from}')"))
}
