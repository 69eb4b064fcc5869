//! URL path parsing for details pages

use thiserror::Error;

use crate::module::{ImportPathError, check_import_path};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePathError {
    #[error("malformed URL path {0:?}")]
    MalformedUrl(String),

    #[error("malformed import path {path:?}: {source}")]
    MalformedImportPath {
        path: String,
        #[source]
        source: ImportPathError,
    },
}

/// Split a URL path of the form `/<path>[@<version>]` into its import path
/// and version.
///
/// A single leading slash is trimmed from the path. When no version is given
/// a single trailing slash is trimmed too; trailing slashes after the version
/// are always trimmed. The version is empty when none was given.
pub fn parse_path_and_version(url_path: &str) -> Result<(String, String), ParsePathError> {
    let parts: Vec<&str> = url_path.split('@').collect();
    let (import_path, version) = match parts[..] {
        [path] => {
            let path = path.strip_prefix('/').unwrap_or(path);
            (path.strip_suffix('/').unwrap_or(path), "")
        }
        [path, version] => (
            path.strip_prefix('/').unwrap_or(path),
            version.trim_end_matches('/'),
        ),
        _ => return Err(ParsePathError::MalformedUrl(url_path.to_string())),
    };

    check_import_path(import_path).map_err(|source| ParsePathError::MalformedImportPath {
        path: import_path.to_string(),
        source,
    })?;

    Ok((import_path.to_string(), version.to_string()))
}
