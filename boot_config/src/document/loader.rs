//! Name resolution, parsing and caching of fragments.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{BootError, BootResult};

use super::directive::classify_document;
use super::node::Document;
use super::parser::parse_node;
use super::store::DocumentStore;

/// Parses `text` as the fragment called `name`.
///
/// # Errors
///
/// Returns [`BootError::MalformedDocument`] on syntax errors, when the root is
/// not an object, or when a directive is malformed.
///
/// # Examples
///
/// ```
/// use boot_config::document::parse_document;
///
/// let doc = parse_document("boot.js", r#"{ "$merge": ["common.js"], "bundles": [] }"#)
///     .expect("valid fragment");
/// assert_eq!(doc.merge(), ["common.js"]);
/// ```
pub fn parse_document(name: &str, text: &str) -> BootResult<Document> {
    let root = parse_node(text)
        .map_err(|err| BootError::malformed(name, err.location(), err.message))?;
    classify_document(name, root)
}

/// Collapses `.` and `..` segments and strips leading separators.
///
/// Returns `None` for empty names and for names climbing above the store
/// root.
pub(crate) fn normalise_name(name: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

fn parent_of(name: &str) -> Option<&str> {
    name.rsplit_once('/').map(|(parent, _)| parent)
}

/// Loads fragments from a [`DocumentStore`] and caches the parsed trees.
///
/// The cache holds parsed but unresolved documents, which do not depend on
/// any variable environment, so one loader may back many concurrent
/// sessions. It is populated lazily; concurrent first loads of the same name
/// keep whichever parse lands first. Call [`DocumentLoader::clear`] between
/// independent boot runs.
pub struct DocumentLoader {
    store: Arc<dyn DocumentStore>,
    cache: RwLock<HashMap<String, Arc<Document>>>,
}

impl DocumentLoader {
    /// Creates a loader over `store` with an empty cache.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves a reference to the canonical name of an existing document.
    ///
    /// A name written inside another document is looked up beside that
    /// document first, then from the store root.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::NotFound`] when no candidate exists.
    pub fn locate(&self, name: &str, from: Option<&str>) -> BootResult<String> {
        let sibling = from
            .and_then(parent_of)
            .and_then(|parent| normalise_name(&format!("{parent}/{name}")));
        let candidates = sibling.into_iter().chain(normalise_name(name));
        for candidate in candidates {
            if self.cache.read().contains_key(&candidate) || self.store.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Err(BootError::not_found(name, from))
    }

    /// Returns the parsed document registered under the canonical `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::NotFound`], [`BootError::Store`] or
    /// [`BootError::MalformedDocument`].
    pub fn load(&self, name: &str) -> BootResult<Arc<Document>> {
        if let Some(cached) = self.cache.read().get(name) {
            debug!(document = name, "served fragment from cache");
            return Ok(Arc::clone(cached));
        }
        let text = self.store.read(name)?;
        let document = Arc::new(parse_document(name, &text)?);
        debug!(
            document = name,
            merges = document.merge().len(),
            "parsed fragment"
        );
        let mut cache = self.cache.write();
        let entry = cache.entry(name.to_owned()).or_insert(document);
        Ok(Arc::clone(entry))
    }

    /// Drops every cached document.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Names currently held in the cache, sorted.
    #[must_use]
    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cache.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("cached", &self.cached_names())
            .finish_non_exhaustive()
    }
}
