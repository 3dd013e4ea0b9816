//! Library interface for the `boot-config` command-line front end.
//!
//! The binary parses [`cli::Args`], layers [`settings::Settings`], resolves
//! each requested root with a [`boot_config::Composer`] over the configured
//! directories, and writes the resolved JSON.

pub mod cli;
pub mod error;
mod fs_helpers;
pub mod output;
pub mod settings;
pub mod telemetry;

use std::collections::HashSet;

use boot_config::document::SearchPathStore;
use boot_config::{Composer, Variables};
use camino::Utf8Path;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cli::Args;
use crate::error::CliError;
use crate::settings::Settings;

/// Runs the front end for already parsed arguments.
///
/// # Errors
///
/// Returns a [`CliError`] when settings, launch parameters, composition or
/// output fail.
pub fn run(args: &Args) -> Result<(), CliError> {
    let settings = Settings::load(args)?;
    let resolved = resolve(args, &settings)?;
    let text = output::render(&resolved, settings.pretty)?;
    output::write(args.output.as_deref(), &text)
}

/// Resolves the requested roots under `settings`.
///
/// A single root yields its document; several roots are resolved in
/// parallel and returned as one object keyed by root name.
///
/// # Errors
///
/// Returns a [`CliError`] when launch parameters cannot be read or a root
/// fails to compose.
pub fn resolve(args: &Args, settings: &Settings) -> Result<Value, CliError> {
    let store = SearchPathStore::from_dirs(&settings.conf_dirs)?;
    debug!(dirs = ?settings.conf_dirs, "configuration search path");
    let composer = Composer::new(store);
    let mut vars = load_variables(settings.run_file.as_deref())?;
    for assignment in &args.assignments {
        vars.set(&assignment.path, assignment.value.clone());
    }

    if let [root] = args.roots.as_slice() {
        info!(root = root.as_str(), "resolving");
        return Ok(composer.resolve(root, &vars)?);
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = args.roots.iter().find(|root| !seen.insert(root.as_str())) {
        return Err(CliError::DuplicateRoot(duplicate.clone()));
    }
    info!(roots = ?args.roots, "resolving in parallel");
    let requests: Vec<(&str, &Variables)> =
        args.roots.iter().map(|root| (root.as_str(), &vars)).collect();
    let documents = composer.resolve_all(&requests)?;
    let combined: Map<String, Value> = args.roots.iter().cloned().zip(documents).collect();
    Ok(Value::Object(combined))
}

fn load_variables(run_file: Option<&Utf8Path>) -> Result<Variables, CliError> {
    let Some(path) = run_file else {
        return Ok(Variables::empty());
    };
    let text = fs_helpers::read_to_string(path)?;
    Ok(Variables::parse(path.as_str(), &text)?)
}
