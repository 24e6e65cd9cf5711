//! Schema source reader

use std::fs;
use std::path::Path;

use crate::error::FileReadError;

/// Read a schema file into memory
///
/// # Errors
///
/// Returns [`FileReadError`] if the file cannot be read or is not UTF-8.
pub fn read_schema(path: &Path) -> Result<String, FileReadError> {
    tracing::debug!(path = %path.display(), "reading schema");
    fs::read_to_string(path).map_err(|source| FileReadError {
        path: path.to_path_buf(),
        source,
    })
}
