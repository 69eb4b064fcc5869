//! Module path and version rules
//!
//! - [`path`]: import path validation and major-version path suffixes
//! - [`version`]: semantic version validation, ordering and latest selection

pub mod path;
pub mod version;

pub use path::{ImportPathError, check_import_path, split_path_version};
pub use version::{compare_versions, find_latest, is_valid_version, major};
