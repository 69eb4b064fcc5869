//! Page headers for package and module details pages

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::license::{self, Metadata};
use crate::module::split_path_version;
use crate::store::{Package, VersionInfo};

/// License information shown in headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseMetadata {
    /// Comma-separated license types (e.g., "MIT, Apache-2.0")
    #[serde(rename = "type")]
    pub license_type: String,
    pub file_path: String,
}

/// Header of a module details page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleHeader {
    pub version: String,
    pub path: String,
    /// Relative commit time (e.g., "3 days ago")
    pub commit_time: String,
    pub repository_url: String,
    pub is_redistributable: bool,
    pub licenses: Vec<LicenseMetadata>,
}

/// Header of a package details page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageHeader {
    pub module: ModuleHeader,
    pub path: String,
    /// Package path relative to its module, or "<name> (root)" for the module root
    pub suffix: String,
    pub synopsis: String,
    pub is_redistributable: bool,
    pub licenses: Vec<LicenseMetadata>,
}

pub fn transform_license_metadata(licenses: &[Metadata]) -> Vec<LicenseMetadata> {
    licenses
        .iter()
        .map(|l| LicenseMetadata {
            license_type: l.types.join(", "),
            file_path: l.file_path.clone(),
        })
        .collect()
}

/// Build the header of a module version.
///
/// `licenses` decides redistributability of the module as a whole.
pub fn create_module(vi: &VersionInfo, licenses: &[Metadata], now: DateTime<Utc>) -> ModuleHeader {
    ModuleHeader {
        version: vi.version.clone(),
        path: vi.module_path.clone(),
        commit_time: elapsed_time(vi.commit_time, now),
        repository_url: vi.repository_url.clone(),
        is_redistributable: license::are_redistributable(licenses),
        licenses: transform_license_metadata(licenses),
    }
}

/// Build the header of a package inside the module version `vi`.
///
/// License files at the module root also make up the module header's licenses.
pub fn create_package(pkg: &Package, vi: &VersionInfo, now: DateTime<Utc>) -> PackageHeader {
    let suffix = pkg
        .path
        .strip_prefix(vi.module_path.as_str())
        .unwrap_or(&pkg.path)
        .trim_start_matches('/');
    let suffix = if suffix.is_empty() {
        format!("{} (root)", effective_name(pkg))
    } else {
        suffix.to_string()
    };

    let module_licenses: Vec<Metadata> = pkg
        .licenses
        .iter()
        .filter(|l| l.dir() == ".")
        .cloned()
        .collect();

    PackageHeader {
        module: create_module(vi, &module_licenses, now),
        path: pkg.path.clone(),
        suffix,
        synopsis: pkg.synopsis.clone(),
        is_redistributable: pkg.is_redistributable(),
        licenses: transform_license_metadata(&pkg.licenses),
    }
}

/// Returns the command name for `main` packages, the package name otherwise.
///
/// The command name is the last path element once any major version suffix
/// (`/v1`, `/v2`, ...) is dropped.
pub fn effective_name(pkg: &Package) -> &str {
    if pkg.name != "main" {
        return &pkg.name;
    }
    let prefix = match pkg.path.strip_suffix("/v1") {
        Some(prefix) => prefix,
        None => split_path_version(&pkg.path).0,
    };
    prefix.rsplit('/').next().unwrap_or(prefix)
}

/// Title of a package details page
pub fn package_title(pkg: &Package) -> String {
    if pkg.name != "main" {
        return format!("Package {}", pkg.name);
    }
    format!("Command {}", effective_name(pkg))
}

/// Reports whether `path` is a standard library import path, i.e. its first
/// element has no dot.
pub fn in_std_lib(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    !first.contains('.')
}

/// Human-readable, relative timestamp of `date` as seen at `now`:
/// - "X hours ago" under 6 hours
/// - "today" between 6 and 24 hours
/// - "Y days ago" under 6 days
/// - a date like "Jan 2, 2006" otherwise
pub fn elapsed_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed_hours = (now - date).num_hours().max(0);
    if elapsed_hours == 1 {
        return "1 hour ago".to_string();
    } else if elapsed_hours < 6 {
        return format!("{elapsed_hours} hours ago");
    }

    let elapsed_days = elapsed_hours / 24;
    if elapsed_days < 1 {
        "today".to_string()
    } else if elapsed_days == 1 {
        "1 day ago".to_string()
    } else if elapsed_days < 6 {
        format!("{elapsed_days} days ago")
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}
