//! The fragment corpus and scratch fragment trees.
//!
//! The corpus mirrors a Cohorte installation: `base` holds the fragments
//! shipped with the platform and `home` the ones of a node installation,
//! which may refer to base fragments by name. Look names up in `home`
//! first.

use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Directory holding the fixture corpus.
#[must_use]
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Platform fragments (`boot-common.js`, `composer/…`, `herald/all-xmpp.js`).
#[must_use]
pub fn base_conf_dir() -> Utf8PathBuf {
    fixtures_dir().join("base")
}

/// Node installation fragments (`python-monitor.js`, `herald/*-transport.js`).
#[must_use]
pub fn home_conf_dir() -> Utf8PathBuf {
    fixtures_dir().join("home")
}

/// Search path for the corpus, most specific first.
#[must_use]
pub fn corpus_conf_dirs() -> Vec<Utf8PathBuf> {
    vec![home_conf_dir(), base_conf_dir()]
}

/// Launch parameters for a Python monitor node running HTTP and XMPP.
#[must_use]
pub fn run_file() -> Utf8PathBuf {
    fixtures_dir().join("run.js")
}

/// A temporary configuration directory populated with fragments.
///
/// The directory is removed when the value is dropped.
#[derive(Debug)]
pub struct FragmentDir {
    dir: TempDir,
    root: Utf8PathBuf,
}

impl FragmentDir {
    /// Creates an empty fragment directory.
    ///
    /// # Errors
    ///
    /// Fails when the temporary directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create fragment directory")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temporary directory {} is not UTF-8", path.display()))?;
        Ok(Self { dir, root })
    }

    /// Creates a directory and writes each `(name, text)` pair into it.
    ///
    /// # Errors
    ///
    /// Fails on any I/O error.
    pub fn with_fragments(fragments: &[(&str, &str)]) -> Result<Self> {
        let dir = Self::new()?;
        for (name, text) in fragments {
            dir.write(name, text)?;
        }
        Ok(dir)
    }

    /// Writes `text` under the relative `name`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails on any I/O error.
    pub fn write(&self, name: &str, text: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, text).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Root of the directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// The underlying temporary directory.
    #[must_use]
    pub const fn temp_dir(&self) -> &TempDir {
        &self.dir
    }
}
