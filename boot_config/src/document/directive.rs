//! Recognition of `$merge` and `$include` directives in parsed trees.
//!
//! Both keys are reserved: they are never treated as data. `$merge` is only
//! accepted among the root members, `$include` only as an object member or
//! as the sole content of an array element.

use std::sync::Arc;

use crate::error::BootError;
use crate::selector::Reference;

use super::node::{Document, Entry, INCLUDE_KEY, Include, Item, MERGE_KEY, Node, index_crumb, key_crumb};

/// Builds a [`Document`] from a parsed root node.
///
/// # Errors
///
/// Returns [`BootError::MalformedDocument`] when the root is not an object or
/// a directive is malformed or misplaced.
pub(crate) fn classify_document(name: &str, root: Node) -> Result<Document, Arc<BootError>> {
    let Node::Object(members) = root else {
        return Err(BootError::malformed(
            name,
            "document root",
            "a fragment must be an object",
        ));
    };
    let mut merge = Vec::new();
    let mut entries = Vec::with_capacity(members.len());
    for member in members {
        match member {
            Entry::Field(key, value) if key == MERGE_KEY => merge.extend(merge_list(name, value)?),
            other => entries.push(classify_entry(name, "", other)?),
        }
    }
    Ok(Document::new(name.to_owned(), merge, entries))
}

fn merge_list(document: &str, value: Node) -> Result<Vec<String>, Arc<BootError>> {
    let invalid = || {
        BootError::malformed(
            document,
            MERGE_KEY,
            "`$merge` must be a document name or a list of document names",
        )
    };
    match value {
        Node::String(single) => Ok(vec![single]),
        Node::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Item::Value(Node::String(name)) => Ok(name),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

fn classify_entry(document: &str, parent: &str, entry: Entry) -> Result<Entry, Arc<BootError>> {
    match entry {
        Entry::Field(key, value) if key == INCLUDE_KEY => {
            let location = key_crumb(parent, INCLUDE_KEY);
            Ok(Entry::Include(include(document, location, value)?))
        }
        Entry::Field(key, _) if key == MERGE_KEY => Err(BootError::malformed(
            document,
            key_crumb(parent, MERGE_KEY),
            "`$merge` is only valid at the document root",
        )),
        Entry::Field(key, value) => {
            let crumb = key_crumb(parent, &key);
            let classified = classify_node(document, &crumb, value)?;
            Ok(Entry::Field(key, classified))
        }
        Entry::Include(include) => Ok(Entry::Include(include)),
    }
}

fn classify_node(document: &str, crumb: &str, node: Node) -> Result<Node, Arc<BootError>> {
    match node {
        Node::Object(members) => members
            .into_iter()
            .map(|member| classify_entry(document, crumb, member))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Object),
        Node::Array(items) => {
            let mut classified = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let item_crumb = index_crumb(crumb, index);
                match item {
                    Item::Value(Node::Object(members)) if is_include_only(&members) => {
                        for member in members {
                            if let Entry::Field(_, value) = member {
                                let location = key_crumb(&item_crumb, INCLUDE_KEY);
                                classified.push(Item::Include(include(document, location, value)?));
                            }
                        }
                    }
                    Item::Value(value) => {
                        classified.push(Item::Value(classify_node(document, &item_crumb, value)?));
                    }
                    Item::Include(include) => classified.push(Item::Include(include)),
                }
            }
            Ok(Node::Array(classified))
        }
        scalar => Ok(scalar),
    }
}

fn is_include_only(members: &[Entry]) -> bool {
    !members.is_empty()
        && members
            .iter()
            .all(|member| matches!(member, Entry::Field(key, _) if key == INCLUDE_KEY))
}

fn include(document: &str, location: String, body: Node) -> Result<Include, Arc<BootError>> {
    let Node::Object(members) = body else {
        return Err(BootError::malformed(
            document,
            location,
            "`$include` must be an object with a `path` and an optional `condition`",
        ));
    };
    let mut paths = None;
    let mut condition = None;
    for member in members {
        match member {
            Entry::Field(key, value) if key == "path" => paths = Some(value),
            Entry::Field(key, Node::String(text)) if key == "condition" => condition = Some(text),
            Entry::Field(key, Node::Null) if key == "condition" => condition = None,
            Entry::Field(key, _) if key == "condition" => {
                return Err(BootError::malformed(
                    document,
                    location,
                    "`condition` must be a string expression",
                ));
            }
            Entry::Field(key, _) => {
                return Err(BootError::malformed(
                    document,
                    location,
                    format!("unexpected key '{key}' in `$include`"),
                ));
            }
            Entry::Include(_) => {
                return Err(BootError::malformed(
                    document,
                    location,
                    "`$include` cannot be nested inside another `$include`",
                ));
            }
        }
    }
    let Some(paths_node) = paths else {
        return Err(BootError::malformed(
            document,
            location,
            "`$include` requires a `path`",
        ));
    };
    let references = references(document, &location, paths_node)?;
    Ok(Include {
        references,
        condition,
        location,
    })
}

fn references(document: &str, location: &str, paths: Node) -> Result<Vec<Reference>, Arc<BootError>> {
    let texts = match paths {
        Node::String(single) => vec![single],
        Node::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Item::Value(Node::String(text)) => Ok(text),
                _ => Err(BootError::malformed(
                    document,
                    location,
                    "`path` entries must be strings",
                )),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(BootError::malformed(
                document,
                location,
                "`path` must be a string or a list of strings",
            ));
        }
    };
    if texts.is_empty() {
        return Err(BootError::malformed(
            document,
            location,
            "`path` must list at least one reference",
        ));
    }
    texts
        .iter()
        .map(|text| {
            Reference::parse(text).map_err(|message| {
                BootError::malformed(document, location, format!("invalid path '{text}': {message}"))
            })
        })
        .collect()
}
