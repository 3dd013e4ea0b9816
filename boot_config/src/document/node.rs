//! Parsed, unresolved document trees.
//!
//! Objects keep their members as an ordered list rather than a map so that
//! duplicated keys survive parsing. Fragments rely on this to place several
//! `$include` directives in the same object.

use serde_json::Number;

use crate::selector::Reference;

/// Reserved key introducing an inclusion directive.
pub const INCLUDE_KEY: &str = "$include";
/// Reserved document-root key listing base documents.
pub const MERGE_KEY: &str = "$merge";

/// A value in an unresolved document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, kept in its parsed representation.
    Number(Number),
    /// String scalar, possibly holding `${run:…}` placeholders.
    String(String),
    /// Ordered sequence.
    Array(Vec<Item>),
    /// Ordered members; keys may repeat.
    Object(Vec<Entry>),
}

/// One position inside an array.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Ordinary element.
    Value(Node),
    /// Directive splicing zero or more elements in place.
    Include(Include),
}

/// One member of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Ordinary `key: value` member.
    Field(String, Node),
    /// Directive merging the keys of the selected objects in place.
    Include(Include),
}

/// A classified `$include` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    /// References to splice, in listed order.
    pub references: Vec<Reference>,
    /// Optional guard expression, evaluated each time the directive is reached.
    pub condition: Option<String>,
    /// Breadcrumb of the directive inside its document.
    pub location: String,
}

/// A named fragment after parsing and directive classification.
///
/// Documents are immutable once built; composition produces new trees and
/// never edits a loaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    name: String,
    merge: Vec<String>,
    entries: Vec<Entry>,
}

impl Document {
    pub(crate) const fn new(name: String, merge: Vec<String>, entries: Vec<Entry>) -> Self {
        Self {
            name,
            merge,
            entries,
        }
    }

    /// Canonical name of the document.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base documents listed under `$merge`, in fold order.
    #[must_use]
    pub fn merge(&self) -> &[String] {
        &self.merge
    }

    /// Root members other than `$merge`.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Appends `key` to a breadcrumb.
pub(crate) fn key_crumb(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

/// Appends an array index to a breadcrumb.
pub(crate) fn index_crumb(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}
