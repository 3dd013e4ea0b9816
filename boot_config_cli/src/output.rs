//! Rendering and writing of resolved documents.

use std::io::Write;

use camino::Utf8Path;
use serde_json::Value;

use crate::error::CliError;
use crate::fs_helpers;

/// Serialises `value`, pretty-printed on request, with a trailing newline.
///
/// # Errors
///
/// Returns [`CliError::Json`] if serialisation fails.
pub fn render(value: &Value, pretty: bool) -> Result<String, CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    Ok(text)
}

/// Writes `text` to `path`, or to standard output when `path` is `None`.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the destination cannot be written.
pub fn write(path: Option<&Utf8Path>, text: &str) -> Result<(), CliError> {
    let Some(target) = path else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        return handle
            .write_all(text.as_bytes())
            .and_then(|()| handle.flush())
            .map_err(|source| CliError::Io {
                path: "<stdout>".into(),
                source,
            });
    };
    fs_helpers::write(target, text)
}
