//! Loading the directory document.

use crate::error::DirectoryError;
use aula_types::Directory;
use std::path::Path;

/// The directory shipped with the binary.
const EMBEDDED_DIRECTORY: &str = include_str!("../data/directory.toml");

/// Parses a directory from its TOML representation.
///
/// Every record must be filed under its own code; the resolver looks records
/// up by the upper-cased code it extracts from the query, so a mismatch would
/// make the record unreachable.
pub fn parse_directory(contents: &str) -> Result<Directory, DirectoryError> {
    let directory: Directory = toml::from_str(contents)?;

    let codes = directory
        .students
        .iter()
        .map(|(key, s)| (key, &s.code))
        .chain(directory.teachers.iter().map(|(key, t)| (key, &t.code)))
        .chain(directory.admins.iter().map(|(key, a)| (key, &a.code)));

    for (key, code) in codes {
        if key != code {
            return Err(DirectoryError::CodeMismatch {
                key: key.clone(),
                code: code.clone(),
            });
        }
    }

    Ok(directory)
}

/// Returns the embedded default directory.
pub fn default_directory() -> Result<Directory, DirectoryError> {
    parse_directory(EMBEDDED_DIRECTORY)
}

/// Loads the directory from `path`, or the embedded default when no path is
/// configured.
pub fn load_directory(path: Option<&Path>) -> Result<Directory, DirectoryError> {
    let Some(path) = path else {
        return default_directory();
    };

    let contents = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let directory = parse_directory(&contents)?;
    tracing::info!(
        path = %path.display(),
        records = directory.len(),
        "loaded directory"
    );
    Ok(directory)
}
