//! Data store layer
//!
//! - [`source`]: `DataSource` trait consumed by the frontend
//! - [`sqlite`]: SQLite implementation of `DataSource`
//! - [`types`]: records returned by the store
//! - [`error`]: `StoreError`, which separates "not found" from store failures

pub mod error;
pub mod source;
pub mod sqlite;
pub mod types;

pub use error::StoreError;
pub use source::DataSource;
pub use sqlite::SqliteStore;
pub use types::{Package, Page, VersionInfo, VersionedPackage};
