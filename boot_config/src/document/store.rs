//! Backends mapping logical document names to raw fragment text.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

use crate::error::{BootError, BootResult};

use super::loader::normalise_name;

/// Source of raw fragment text, addressed by logical name.
///
/// Names are `/`-separated relative paths such as `herald/all-xmpp.js`.
/// Stores are shared between concurrent sessions and must tolerate
/// concurrent reads.
pub trait DocumentStore: Send + Sync {
    /// Whether a document is registered under `name`.
    fn contains(&self, name: &str) -> bool;

    /// Reads the raw text registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::NotFound`] when nothing is registered under
    /// `name`, or [`BootError::Store`] when the backend fails.
    fn read(&self, name: &str) -> BootResult<String>;
}

/// In-memory store, mostly useful for embedded fragments and tests.
///
/// # Examples
///
/// ```
/// use boot_config::document::{DocumentStore, MemoryStore};
///
/// let store = MemoryStore::new().with("boot.js", "{}");
/// assert!(store.contains("./boot.js"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: BTreeMap::new(),
        }
    }

    /// Registers `text` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl AsRef<str>, text: impl Into<String>) {
        let key = normalise_name(name.as_ref()).unwrap_or_else(|| name.as_ref().to_owned());
        self.documents.insert(key, text.into());
    }

    /// Builder-style variant of [`MemoryStore::insert`].
    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

impl<N, T> FromIterator<(N, T)> for MemoryStore
where
    N: AsRef<str>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (name, text) in iter {
            store.insert(name, text);
        }
        store
    }
}

impl DocumentStore for MemoryStore {
    fn contains(&self, name: &str) -> bool {
        normalise_name(name).is_some_and(|key| self.documents.contains_key(&key))
    }

    fn read(&self, name: &str) -> BootResult<String> {
        normalise_name(name)
            .and_then(|key| self.documents.get(&key).cloned())
            .ok_or_else(|| BootError::not_found(name, None))
    }
}

/// Store backed by one configuration directory.
///
/// The directory is opened once through `cap-std`, so names resolve strictly
/// beneath it: absolute paths and `..` escapes are refused by the capability
/// handle rather than by string checks alone.
#[derive(Debug)]
pub struct DirectoryStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl DirectoryStore {
    /// Opens `root` as a configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::Store`] when the directory cannot be opened.
    pub fn open(root: impl AsRef<Utf8Path>) -> BootResult<Self> {
        let path = root.as_ref();
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| BootError::store(path.as_str(), err))?;
        Ok(Self {
            root: path.to_owned(),
            dir,
        })
    }

    /// Directory this store reads from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl DocumentStore for DirectoryStore {
    fn contains(&self, name: &str) -> bool {
        normalise_name(name).is_some_and(|key| self.dir.is_file(key))
    }

    fn read(&self, name: &str) -> BootResult<String> {
        let Some(key) = normalise_name(name) else {
            return Err(BootError::not_found(name, None));
        };
        self.dir.read_to_string(&key).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                BootError::not_found(name, None)
            } else {
                BootError::store(self.root.join(&key).as_str(), err)
            }
        })
    }
}

/// Ordered list of stores; the first one holding a name serves it.
///
/// Mirrors a base directory overriding an installation directory: put the
/// most specific store first.
#[derive(Default)]
pub struct SearchPathStore {
    stores: Vec<Box<dyn DocumentStore>>,
}

impl SearchPathStore {
    /// Creates an empty search path.
    #[must_use]
    pub const fn new() -> Self {
        Self { stores: Vec::new() }
    }

    /// Appends a store with lower priority than those already present.
    pub fn push(&mut self, store: impl DocumentStore + 'static) {
        self.stores.push(Box::new(store));
    }

    /// Builder-style variant of [`SearchPathStore::push`].
    #[must_use]
    pub fn with(mut self, store: impl DocumentStore + 'static) -> Self {
        self.push(store);
        self
    }

    /// Opens each directory as a [`DirectoryStore`], in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::Store`] for the first directory that cannot be
    /// opened.
    pub fn from_dirs<I, P>(dirs: I) -> BootResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Utf8Path>,
    {
        let mut search = Self::new();
        for dir in dirs {
            search.push(DirectoryStore::open(dir)?);
        }
        Ok(search)
    }

    /// Number of stores on the search path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Whether the search path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl DocumentStore for SearchPathStore {
    fn contains(&self, name: &str) -> bool {
        self.stores.iter().any(|store| store.contains(name))
    }

    fn read(&self, name: &str) -> BootResult<String> {
        self.stores
            .iter()
            .find(|store| store.contains(name))
            .map_or_else(|| Err(BootError::not_found(name, None)), |store| store.read(name))
    }
}
