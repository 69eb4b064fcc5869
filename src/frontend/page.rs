//! Details page assembly
//!
//! Flow for one request:
//!
//! ```text
//! parse path -> resolve version -> pick tab -> gate -> fetch details -> page
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ImportedByConfig;
use crate::frontend::details::{
    Details, PackageDetailsContext, PaginationParams, fetch_details_for_module,
    fetch_details_for_package,
};
use crate::frontend::error::FrontendError;
use crate::frontend::header::{
    ModuleHeader, PackageHeader, create_module, create_package, package_title,
};
use crate::frontend::parse::parse_path_and_version;
use crate::frontend::resolve::{resolve_module, resolve_package};
use crate::frontend::tabs::{
    ModuleTab, PackageTab, Tab, TabRegistries, TabSettings, can_show_details,
};
use crate::license::to_metadatas;
use crate::store::DataSource;

/// URL namespace of a details page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Pkg,
    Mod,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Pkg => "pkg",
            Namespace::Mod => "mod",
        }
    }
}

/// Header of a details page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Header {
    Package(PackageHeader),
    Module(ModuleHeader),
}

/// Everything the renderer needs for one details page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsPage<T: Tab> {
    pub title: String,
    /// Selected tab, after falling back from unknown names
    pub settings: TabSettings<T>,
    pub header: Header,
    /// Absent when the content may not be shown
    pub details: Option<Details>,
    pub can_show_details: bool,
    /// All tabs of the namespace, for navigation
    pub tabs: Vec<TabSettings<T>>,
    pub namespace: Namespace,
}

/// A details page request, with the namespace prefix already removed from
/// the URL path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailsRequest {
    /// `/<path>[@<version>]`
    pub url_path: String,
    /// Requested tab; may be empty or unknown
    pub tab: String,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl DetailsRequest {
    pub fn new(url_path: &str) -> Self {
        Self {
            url_path: url_path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tab(mut self, tab: &str) -> Self {
        self.tab = tab.to_string();
        self
    }

    pub fn with_pagination(mut self, page: Option<usize>, limit: Option<usize>) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }
}

/// Serves package and module details pages from a data store
pub struct Server<S: DataSource> {
    store: Arc<S>,
    tabs: Arc<TabRegistries>,
    imported_by: ImportedByConfig,
    clock: fn() -> DateTime<Utc>,
}

impl<S: DataSource> Server<S> {
    pub fn new(store: Arc<S>, tabs: Arc<TabRegistries>, imported_by: ImportedByConfig) -> Self {
        Self {
            store,
            tabs,
            imported_by,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for relative commit times
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the page for `/pkg/<import-path>[@<version>]?tab=<tab>`.
    pub fn serve_package_details(
        &self,
        req: &DetailsRequest,
    ) -> Result<DetailsPage<PackageTab>, FrontendError> {
        self.package_details(req)
            .inspect_err(|e| log_failure(Namespace::Pkg, req, e))
    }

    /// Build the page for `/mod/<module-path>@<version>?tab=<tab>`.
    pub fn serve_module_details(
        &self,
        req: &DetailsRequest,
    ) -> Result<DetailsPage<ModuleTab>, FrontendError> {
        self.module_details(req)
            .inspect_err(|e| log_failure(Namespace::Mod, req, e))
    }

    fn package_details(
        &self,
        req: &DetailsRequest,
    ) -> Result<DetailsPage<PackageTab>, FrontendError> {
        let (path, version) = parse_path_and_version(&req.url_path)
            .map_err(|e| FrontendError::malformed(e.to_string()))?;
        let pkg = resolve_package(self.store.as_ref(), &path, &version)?;
        let now = (self.clock)();

        let header = create_package(&pkg.package, &pkg.version_info, now);
        let is_redistributable = pkg.is_redistributable();
        let settings = self.tabs.package_tab(&req.tab, is_redistributable)?;
        let can_show_details = can_show_details(is_redistributable, &settings);

        let details = if can_show_details {
            let ctx = PackageDetailsContext {
                pkg: &pkg,
                pagination: PaginationParams::new(
                    req.page,
                    req.limit,
                    self.imported_by.default_limit,
                    self.imported_by.max_limit,
                ),
                now,
            };
            Some(fetch_details_for_package(
                self.store.as_ref(),
                settings.tab,
                &ctx,
            )?)
        } else {
            None
        };

        info!(
            "Serving {} tab for {}@{}",
            settings.name(),
            pkg.package.path,
            pkg.version_info.version
        );
        Ok(DetailsPage {
            title: package_title(&pkg.package),
            settings,
            header: Header::Package(header),
            details,
            can_show_details,
            tabs: self.tabs.package.settings(),
            namespace: Namespace::Pkg,
        })
    }

    fn module_details(
        &self,
        req: &DetailsRequest,
    ) -> Result<DetailsPage<ModuleTab>, FrontendError> {
        let (path, version) = parse_path_and_version(&req.url_path)
            .map_err(|e| FrontendError::malformed(e.to_string()))?;
        let vi = resolve_module(self.store.as_ref(), &path, &version)?;
        let licenses = self.store.get_module_licenses(&path, &version)?;
        let now = (self.clock)();

        let header = create_module(&vi, &to_metadatas(&licenses), now);
        let settings = self.tabs.module_tab(&req.tab)?;
        let can_show_details = can_show_details(header.is_redistributable, &settings);

        let details = if can_show_details {
            Some(fetch_details_for_module(
                self.store.as_ref(),
                settings.tab,
                &vi,
                &licenses,
                now,
            )?)
        } else {
            None
        };

        info!(
            "Serving {} tab for module {}@{}",
            settings.name(),
            vi.module_path,
            vi.version
        );
        Ok(DetailsPage {
            title: vi.module_path.clone(),
            settings,
            header: Header::Module(header),
            details,
            can_show_details,
            tabs: self.tabs.module.settings(),
            namespace: Namespace::Mod,
        })
    }
}

fn log_failure(namespace: Namespace, req: &DetailsRequest, err: &FrontendError) {
    let ns = namespace.as_str();
    match err {
        FrontendError::InternalBug(_) | FrontendError::Infrastructure(_) => {
            error!("/{}{} (tab {:?}): {:?}", ns, req.url_path, req.tab, err)
        }
        FrontendError::MalformedInput { .. } => {
            warn!("/{}{}: {}", ns, req.url_path, err)
        }
        FrontendError::NotFound(_) | FrontendError::VersionMismatch { .. } => {
            info!("/{}{}: {}", ns, req.url_path, err)
        }
    }
}
