//! Command-line interface definitions for `boot-config`.

use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::Parser;
use serde_json::Value;

use boot_config::Variables;

/// Parsed CLI arguments for `boot-config`.
#[derive(Debug, Parser)]
#[command(name = "boot-config")]
#[command(about = "Resolve boot-configuration fragments into one JSON document")]
#[command(version)]
pub struct Args {
    /// Root fragments to resolve (for example `python-monitor.js`).
    #[arg(required = true, value_name = "ROOT")]
    pub roots: Vec<String>,
    /// Settings file (defaults to `boot-config.toml` when present).
    #[arg(long, value_name = "FILE")]
    pub settings: Option<Utf8PathBuf>,
    /// Log composition steps at debug level.
    #[arg(short, long)]
    pub verbose: bool,
    /// Configuration directory to search, most specific first (repeatable).
    #[arg(short = 'C', long = "conf-dir", value_name = "DIR")]
    pub conf_dirs: Vec<Utf8PathBuf>,
    /// Launch parameters document providing `${run:…}` values.
    #[arg(long = "run", value_name = "FILE")]
    pub run_file: Option<Utf8PathBuf>,
    /// Override one launch parameter (repeatable).
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub assignments: Vec<Assignment>,
    /// Pretty-print the resolved document.
    #[arg(long)]
    pub pretty: bool,
    /// Write the result to a file instead of standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

/// One `--set PATH=VALUE` override.
///
/// The value is read with the fragment syntax when it parses (numbers,
/// booleans, lists, objects) and taken as plain text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Dotted variable path.
    pub path: String,
    /// Value to store.
    pub value: Value,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (path, raw) = text
            .split_once('=')
            .ok_or_else(|| format!("expected PATH=VALUE, got '{text}'"))?;
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(format!("missing variable path in '{text}'"));
        }
        let value = Variables::parse("--set", raw)
            .map_or_else(|_| Value::String(raw.to_owned()), |parsed| parsed.root().clone());
        Ok(Self {
            path: trimmed.to_owned(),
            value,
        })
    }
}
