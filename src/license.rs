//! License metadata and redistributability
//!
//! Content is redistributable only if every license file found for it is
//! recognized, and every license type it declares permits redistribution.

use serde::{Deserialize, Serialize};

/// License types whose terms allow showing documentation and READMEs.
const REDISTRIBUTABLE_TYPES: &[&str] = &[
    "AGPL-3.0",
    "Apache-2.0",
    "Artistic-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSL-1.0",
    "CC-BY-4.0",
    "CC0-1.0",
    "EPL-2.0",
    "GPL-2.0",
    "GPL-3.0",
    "ISC",
    "LGPL-2.1",
    "LGPL-3.0",
    "MIT",
    "MPL-2.0",
    "Unlicense",
    "Zlib",
];

/// Metadata for a license file found in a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Detected license types (e.g., ["MIT"]); empty if unrecognized
    pub types: Vec<String>,
    /// Path of the license file relative to the module root (e.g., "LICENSE", "sub/COPYING")
    pub file_path: String,
}

impl Metadata {
    pub fn new(types: &[&str], file_path: &str) -> Self {
        Self {
            types: types.iter().map(|t| t.to_string()).collect(),
            file_path: file_path.to_string(),
        }
    }

    /// Directory of the license file; "." for the module root
    pub fn dir(&self) -> &str {
        match self.file_path.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => dir,
            _ => ".",
        }
    }

    pub fn is_redistributable(&self) -> bool {
        !self.types.is_empty()
            && self
                .types
                .iter()
                .all(|t| REDISTRIBUTABLE_TYPES.contains(&t.as_str()))
    }
}

/// A license file together with its contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub metadata: Metadata,
    pub contents: String,
}

/// Reports whether content covered by `licenses` may be redistributed.
pub fn are_redistributable(licenses: &[Metadata]) -> bool {
    !licenses.is_empty() && licenses.iter().all(Metadata::is_redistributable)
}

/// Extract the metadata of each license.
pub fn to_metadatas(licenses: &[License]) -> Vec<Metadata> {
    licenses.iter().map(|l| l.metadata.clone()).collect()
}
