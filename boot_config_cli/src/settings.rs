//! Layered settings for the command-line front end.
//!
//! Precedence, lowest first: built-in defaults, the TOML settings file,
//! `BOOT_CONFIG_*` environment variables, then command-line flags.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Args;
use crate::error::CliError;

/// Settings file read from the working directory when `--settings` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "boot-config.toml";

/// Prefix of the environment variables overriding settings.
pub const ENV_PREFIX: &str = "BOOT_CONFIG_";

/// Resolved front-end settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Configuration directories, most specific first.
    pub conf_dirs: Vec<Utf8PathBuf>,
    /// Launch parameters document.
    pub run_file: Option<Utf8PathBuf>,
    /// Pretty-print output.
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conf_dirs: vec![Utf8PathBuf::from("conf")],
            run_file: None,
            pretty: false,
        }
    }
}

/// Values given on the command line; unset flags leave lower layers alone.
#[derive(Debug, Serialize)]
struct CliLayer<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conf_dirs: Vec<&'a Utf8Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_file: Option<&'a Utf8Path>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pretty: bool,
}

impl Settings {
    /// Builds the settings for `args`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingSettings`] when an explicit `--settings`
    /// file does not exist, and [`CliError::Settings`] when a layer cannot be
    /// read or extracted.
    pub fn load(args: &Args) -> Result<Self, CliError> {
        let file = match &args.settings {
            Some(path) if !path.is_file() => return Err(CliError::MissingSettings(path.clone())),
            Some(path) => path.clone(),
            None => Utf8PathBuf::from(DEFAULT_SETTINGS_FILE),
        };
        debug!(settings = %file, "loading settings");
        let cli = CliLayer {
            conf_dirs: args.conf_dirs.iter().map(Utf8PathBuf::as_path).collect(),
            run_file: args.run_file.as_deref(),
            pretty: args.pretty,
        };
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file.as_std_path()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(cli))
            .extract()
            .map_err(|err| CliError::Settings(Box::new(err)))
    }
}
