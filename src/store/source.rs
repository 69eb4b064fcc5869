//! DataSource trait for reading module and package data

#[cfg(test)]
use mockall::automock;

use crate::license::License;
use crate::store::error::StoreError;
use crate::store::types::{Package, Page, VersionInfo, VersionedPackage};

/// Trait for fetching modules, packages and their sub-data
///
/// Every method returns `StoreError::NotFound` when the addressed record does
/// not exist; any other error means the store itself failed.
#[cfg_attr(test, automock)]
pub trait DataSource: Send + Sync + 'static {
    /// Get the package at the latest version of the module that contains it
    fn get_latest_package(&self, path: &str) -> Result<VersionedPackage, StoreError>;

    /// Get the package at an exact version
    fn get_package(&self, path: &str, version: &str) -> Result<VersionedPackage, StoreError>;

    /// Get a module version
    fn get_version_info(
        &self,
        module_path: &str,
        version: &str,
    ) -> Result<VersionInfo, StoreError>;

    /// Get every license file in a module version
    fn get_module_licenses(
        &self,
        module_path: &str,
        version: &str,
    ) -> Result<Vec<License>, StoreError>;

    /// Get every package in a module version, ordered by path
    fn get_version_packages(
        &self,
        module_path: &str,
        version: &str,
    ) -> Result<Vec<Package>, StoreError>;

    /// Get every module version that contains the package
    fn get_package_versions(&self, path: &str) -> Result<Vec<VersionInfo>, StoreError>;

    /// Get the import paths of a package at a version, ordered by path
    fn get_imports(&self, path: &str, version: &str) -> Result<Vec<String>, StoreError>;

    /// Get one page of the packages importing `path`
    fn get_imported_by(
        &self,
        path: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<String>, StoreError>;

    /// Get the license files that apply to a package at a version
    fn get_package_licenses(
        &self,
        path: &str,
        version: &str,
    ) -> Result<Vec<License>, StoreError>;
}
