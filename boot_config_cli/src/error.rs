//! Error types for `boot-config`.

use std::sync::Arc;

use boot_config::BootError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced by the `boot-config` front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Composition of a root fragment failed.
    #[error(transparent)]
    Boot(#[from] Arc<BootError>),

    /// A settings layer could not be read or extracted.
    #[error("invalid settings: {0}")]
    Settings(Box<figment::Error>),

    /// An explicit `--settings` file is missing.
    #[error("settings file {0} does not exist")]
    MissingSettings(Utf8PathBuf),

    /// The resolved document could not be serialised.
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Several roots share a name, so the combined output would lose one.
    #[error("root '{0}' was requested more than once")]
    DuplicateRoot(String),

    /// Reading input or writing output failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}
