//! Version resolution for details pages
//!
//! Packages fall back to their latest version when no version is requested.
//! When a requested package version is missing, one extra lookup of the
//! latest version tells "no such package" apart from "not at this version".
//! Modules always need an explicit version.

use tracing::debug;

use crate::frontend::error::FrontendError;
use crate::module::is_valid_version;
use crate::store::{DataSource, StoreError, VersionInfo, VersionedPackage};

fn invalid_version(version: &str, path: &str) -> FrontendError {
    FrontendError::MalformedInput {
        message: format!("{version:?} is not a valid semantic version."),
        secondary_message: Some(format!(
            r#"To search for packages like {path:?}, <a href="/search?q={path}">click here</a>."#
        )),
    }
}

fn classify(err: StoreError, what: String) -> FrontendError {
    if err.is_not_found() {
        FrontendError::NotFound(what)
    } else {
        FrontendError::Infrastructure(err)
    }
}

/// Resolve the package at `path`, at `version` or at its latest version if
/// `version` is empty.
pub fn resolve_package<S: DataSource + ?Sized>(
    store: &S,
    path: &str,
    version: &str,
) -> Result<VersionedPackage, FrontendError> {
    if version.is_empty() {
        debug!("No version requested for {}, using latest", path);
        return store
            .get_latest_package(path)
            .map_err(|err| classify(err, format!("package {path}")));
    }
    if !is_valid_version(version) {
        return Err(invalid_version(version, path));
    }

    match store.get_package(path, version) {
        Ok(pkg) => Ok(pkg),
        Err(err) if !err.is_not_found() => Err(FrontendError::Infrastructure(err)),
        Err(_) => {
            debug!(
                "{}@{} not found, checking whether other versions exist",
                path, version
            );
            // Only whether the latest lookup succeeds matters here.
            match store.get_latest_package(path) {
                Ok(_) => Err(FrontendError::VersionMismatch {
                    path: path.to_string(),
                    version: version.to_string(),
                }),
                Err(err) => Err(classify(err, format!("package {path}"))),
            }
        }
    }
}

/// Resolve the module at `path` and `version`.
pub fn resolve_module<S: DataSource + ?Sized>(
    store: &S,
    path: &str,
    version: &str,
) -> Result<VersionInfo, FrontendError> {
    if version.is_empty() {
        return Err(FrontendError::malformed(format!(
            "Version for {path:?} must be specified."
        )));
    }
    if !is_valid_version(version) {
        return Err(invalid_version(version, path));
    }

    store
        .get_version_info(path, version)
        .map_err(|err| classify(err, format!("module {path}@{version}")))
}
