//! Composition engine for Cohorte-style boot configuration fragments.
//!
//! Fragments are JSON-like documents that layer on one another through two
//! directives: `$merge` folds whole documents underneath the current one,
//! and `$include` splices selected nodes from another document, optionally
//! guarded by a `condition`. String scalars may carry `${run:path}`
//! placeholders that are filled from a per-session [`Variables`] tree.
//!
//! The entry point is [`Composer`], which owns a parse cache over a
//! [`document::DocumentStore`] and resolves a root fragment into a plain
//! [`serde_json::Value`].

pub mod compose;
pub mod condition;
pub mod document;
mod error;
pub mod selector;
mod variables;

pub use compose::Composer;
pub use condition::{Condition, ConditionError};
pub use error::{AggregatedErrors, BootError, BootResult, SessionFailure};
pub use variables::{ABSENT_TEXT, Lookup, Variables, render_value};
