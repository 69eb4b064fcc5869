//! Records returned by the data store

use chrono::{DateTime, Utc};

use crate::license::{self, Metadata};

/// A single version of a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub module_path: String,
    pub version: String,
    pub commit_time: DateTime<Utc>,
    pub repository_url: String,
    /// Path of the README relative to the module root; empty if the module has none
    pub readme_file_path: String,
    pub readme_contents: String,
}

/// A package inside a module version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Full import path (e.g., "golang.org/x/text/language")
    pub path: String,
    /// Declared package name; "main" for commands
    pub name: String,
    pub synopsis: String,
    /// Licenses that apply to this package's directory
    pub licenses: Vec<Metadata>,
    pub documentation_html: String,
}

impl Package {
    pub fn is_redistributable(&self) -> bool {
        license::are_redistributable(&self.licenses)
    }
}

/// A package together with the module version that contains it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedPackage {
    pub package: Package,
    pub version_info: VersionInfo,
}

impl VersionedPackage {
    pub fn is_redistributable(&self) -> bool {
        self.package.is_redistributable()
    }
}

/// One page of results plus the total number of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}
