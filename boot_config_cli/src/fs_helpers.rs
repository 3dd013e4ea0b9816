//! Filesystem helpers shared by the front-end modules.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::CliError;

fn io_error(path: &Utf8Path, source: std::io::Error) -> CliError {
    CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Splits `path` into its directory (`.` when bare) and file name.
fn split(path: &Utf8Path) -> Result<(&Utf8Path, &str), CliError> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io_error(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        )
    })?;
    Ok((parent, file_name))
}

/// Reads the UTF-8 file at `path` through its parent directory.
pub(crate) fn read_to_string(path: &Utf8Path) -> Result<String, CliError> {
    let (parent, file_name) = split(path)?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|source| io_error(path, source))?;
    dir.read_to_string(file_name)
        .map_err(|source| io_error(path, source))
}

/// Writes `text` to `path`, creating missing parent directories.
pub(crate) fn write(path: &Utf8Path, text: &str) -> Result<(), CliError> {
    let (parent, file_name) = split(path)?;
    Dir::create_ambient_dir_all(parent, ambient_authority())
        .map_err(|source| io_error(path, source))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|source| io_error(path, source))?;
    dir.write(file_name, text)
        .map_err(|source| io_error(path, source))
}
