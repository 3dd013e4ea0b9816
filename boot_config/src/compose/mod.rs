//! The composition engine: `$merge` folding, `$include` splicing and
//! placeholder substitution over a shared fragment cache.

mod merge;
mod session;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::document::{DocumentLoader, DocumentStore};
use crate::error::{BootError, BootResult, SessionFailure};
use crate::variables::Variables;

pub use merge::{IDENTITY_KEY, merge_value};

use session::Session;

/// Resolves boot fragments into fully composed configurations.
///
/// A `Composer` owns the parse cache. Each call to [`Composer::resolve`] is an
/// independent session with its own variables, cycle stack and memo, so one
/// composer can serve many roots, sequentially or from several threads.
///
/// # Examples
///
/// ```
/// use boot_config::document::MemoryStore;
/// use boot_config::{Composer, Variables};
/// use serde_json::json;
///
/// let store = MemoryStore::new()
///     .with("common.js", r#"{ "properties": { "a": 1 } }"#)
///     .with("boot.js", r#"{ "$merge": ["common.js"], "properties": { "b": "${run:b}" } }"#);
/// let composer = Composer::new(store);
/// let vars = Variables::new(json!({"b": 2}));
/// let resolved = composer.resolve("boot.js", &vars).expect("composes");
/// assert_eq!(resolved, json!({"properties": {"a": 1, "b": 2}}));
/// ```
#[derive(Debug)]
pub struct Composer {
    loader: DocumentLoader,
}

impl Composer {
    /// Creates a composer reading fragments from `store`.
    #[must_use]
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self::with_store(Arc::new(store))
    }

    /// Creates a composer over an already shared store.
    #[must_use]
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            loader: DocumentLoader::new(store),
        }
    }

    /// Resolves the fragment `root` against `vars`.
    ///
    /// The result contains no directives and no placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first [`BootError`] raised by the session: a missing or
    /// malformed fragment, an unresolvable include path, an invalid
    /// condition, or a reference cycle.
    pub fn resolve(&self, root: &str, vars: &Variables) -> BootResult<Value> {
        let name = self.loader.locate(root, None)?;
        debug!(root = name.as_str(), "resolving boot configuration");
        let resolved = Session::new(&self.loader, vars).resolve(&name)?;
        Ok(Arc::unwrap_or_clone(resolved))
    }

    /// Resolves several independent sessions in parallel.
    ///
    /// Results are returned in request order. Sessions share the parse
    /// cache but nothing else.
    ///
    /// # Errors
    ///
    /// When any session fails, every failure is reported together with its
    /// root; a single failure is returned as is and several are wrapped in
    /// [`BootError::Aggregate`].
    pub fn resolve_all(&self, requests: &[(&str, &Variables)]) -> BootResult<Vec<Value>> {
        let outcomes: Vec<BootResult<Value>> = std::thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|&(root, vars)| scope.spawn(move || self.resolve(root, vars)))
                .collect();
            handles
                .into_iter()
                .zip(requests)
                .map(|(handle, &(root, _))| {
                    handle.join().unwrap_or_else(|_| {
                        Err(BootError::malformed(root, "root", "resolution thread panicked"))
                    })
                })
                .collect()
        });
        let mut values = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (outcome, &(root, _)) in outcomes.into_iter().zip(requests) {
            match outcome {
                Ok(value) => values.push(value),
                Err(err) => failures.push(SessionFailure::new(root, err)),
            }
        }
        BootError::from_sessions(failures).map_or(Ok(values), Err)
    }

    /// Drops every cached fragment so the next session rereads the store.
    pub fn clear_cache(&self) {
        debug!("clearing fragment cache");
        self.loader.clear();
    }

    /// Canonical names of the cached fragments, sorted.
    #[must_use]
    pub fn cached_names(&self) -> Vec<String> {
        self.loader.cached_names()
    }

    /// The loader backing this composer.
    #[must_use]
    pub const fn loader(&self) -> &DocumentLoader {
        &self.loader
    }
}
