pub mod config;
pub mod frontend;
pub mod license;
pub mod logging;
pub mod module;
pub mod store;
