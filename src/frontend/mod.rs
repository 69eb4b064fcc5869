//! Details page decision layer
//!
//! Turns a `/<path>[@<version>]` request into a renderable page model.
//!
//! # Modules
//!
//! - [`parse`]: splits URL paths into import path and version
//! - [`resolve`]: resolves the requested version against the store
//! - [`tabs`]: tab registries and the redistributability gate
//! - [`details`]: one detail fetcher per tab
//! - [`header`]: package and module headers, relative commit times
//! - [`page`]: `Server`, which ties the steps together per request
//! - [`error`]: error taxonomy and its HTTP status mapping

pub mod details;
pub mod error;
pub mod header;
pub mod page;
pub mod parse;
pub mod resolve;
pub mod tabs;

pub use error::FrontendError;
pub use page::{DetailsPage, DetailsRequest, Header, Namespace, Server};
pub use tabs::{ModuleTab, PackageTab, TabRegistries, TabSettings};
