//! Tab details for package and module pages
//!
//! Each tab maps to exactly one fetcher; every fetcher queries the store for
//! only the data its view needs.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::frontend::error::FrontendError;
use crate::frontend::header::{PackageHeader, create_package, elapsed_time, in_std_lib};
use crate::frontend::tabs::{ModuleTab, PackageTab};
use crate::license::License;
use crate::module::{compare_versions, major};
use crate::store::{DataSource, VersionInfo, VersionedPackage};

/// Details of the selected tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Details {
    Documentation(DocumentationDetails),
    Readme(ReadmeDetails),
    Module(ModuleDetails),
    Versions(VersionsDetails),
    Imports(ImportsDetails),
    ImportedBy(ImportedByDetails),
    Licenses(LicensesDetails),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationDetails {
    pub module_path: String,
    /// Rendered documentation HTML
    pub documentation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadmeDetails {
    pub module_path: String,
    pub readme_file_path: String,
    pub readme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDetails {
    pub module_path: String,
    pub version: String,
    pub packages: Vec<PackageHeader>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub module_path: String,
    pub version: String,
    pub commit_time: String,
}

/// Versions sharing one major version, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorVersionGroup {
    pub major: String,
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionsDetails {
    /// Groups ordered by major version, newest first
    pub groups: Vec<MajorVersionGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportsDetails {
    pub module_path: String,
    pub external_imports: Vec<String>,
    pub std_lib: Vec<String>,
    pub total: usize,
}

/// Page/limit of a paginated view; `page` is 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: usize,
    pub limit: usize,
}

impl PaginationParams {
    /// Normalize request values: pages start at 1, a missing or zero limit
    /// becomes `default_limit`, and limits are capped at `max_limit`.
    pub fn new(
        page: Option<usize>,
        limit: Option<usize>,
        default_limit: usize,
        max_limit: usize,
    ) -> Self {
        let limit = match limit {
            Some(0) | None => default_limit,
            Some(limit) => limit,
        };
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.min(max_limit).max(1),
        }
    }

    /// Number of items before this page; saturates for out-of-range pages
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub num_pages: usize,
}

impl Pagination {
    pub fn new(params: PaginationParams, total: usize) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            total,
            num_pages: total.div_ceil(params.limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedByDetails {
    pub module_path: String,
    pub imported_by: Vec<String>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseView {
    pub types: Vec<String>,
    pub file_path: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensesDetails {
    pub licenses: Vec<LicenseView>,
}

/// Inputs shared by the package detail fetchers
pub struct PackageDetailsContext<'a> {
    pub pkg: &'a VersionedPackage,
    pub pagination: PaginationParams,
    pub now: DateTime<Utc>,
}

/// Fetch the details of a package tab.
pub fn fetch_details_for_package<S: DataSource + ?Sized>(
    store: &S,
    tab: PackageTab,
    ctx: &PackageDetailsContext<'_>,
) -> Result<Details, FrontendError> {
    debug!("Fetching {:?} details for {}", tab, ctx.pkg.package.path);
    let details = match tab {
        PackageTab::Doc => Details::Documentation(fetch_documentation_details(ctx.pkg)),
        PackageTab::Readme => Details::Readme(fetch_readme_details(&ctx.pkg.version_info)),
        PackageTab::Module => Details::Module(fetch_module_details(
            store,
            &ctx.pkg.version_info,
            ctx.now,
        )?),
        PackageTab::Versions => {
            Details::Versions(fetch_versions_details(store, ctx.pkg, ctx.now)?)
        }
        PackageTab::Imports => Details::Imports(fetch_imports_details(store, ctx.pkg)?),
        PackageTab::ImportedBy => Details::ImportedBy(fetch_imported_by_details(
            store,
            ctx.pkg,
            ctx.pagination,
        )?),
        PackageTab::Licenses => {
            Details::Licenses(fetch_package_licenses_details(store, ctx.pkg)?)
        }
    };
    Ok(details)
}

/// Fetch the details of a module tab.
///
/// `licenses` are the module's licenses, already fetched for the header.
pub fn fetch_details_for_module<S: DataSource + ?Sized>(
    store: &S,
    tab: ModuleTab,
    vi: &VersionInfo,
    licenses: &[License],
    now: DateTime<Utc>,
) -> Result<Details, FrontendError> {
    debug!("Fetching {:?} details for {}@{}", tab, vi.module_path, vi.version);
    let details = match tab {
        ModuleTab::Packages => Details::Module(fetch_module_details(store, vi, now)?),
        ModuleTab::Licenses => Details::Licenses(LicensesDetails {
            licenses: transform_licenses(licenses),
        }),
        // TODO: replace the README placeholder once a module versions view exists.
        ModuleTab::Readme | ModuleTab::Versions => Details::Readme(fetch_readme_details(vi)),
    };
    Ok(details)
}

pub fn fetch_documentation_details(pkg: &VersionedPackage) -> DocumentationDetails {
    DocumentationDetails {
        module_path: pkg.version_info.module_path.clone(),
        documentation: pkg.package.documentation_html.clone(),
    }
}

pub fn fetch_readme_details(vi: &VersionInfo) -> ReadmeDetails {
    ReadmeDetails {
        module_path: vi.module_path.clone(),
        readme_file_path: vi.readme_file_path.clone(),
        readme: vi.readme_contents.clone(),
    }
}

/// List the packages of a module version. Synopses are only kept for
/// redistributable packages.
pub fn fetch_module_details<S: DataSource + ?Sized>(
    store: &S,
    vi: &VersionInfo,
    now: DateTime<Utc>,
) -> Result<ModuleDetails, FrontendError> {
    let packages = store
        .get_version_packages(&vi.module_path, &vi.version)?
        .iter()
        .map(|p| {
            let mut header = create_package(p, vi, now);
            if !p.is_redistributable() {
                header.synopsis.clear();
            }
            header
        })
        .collect();

    Ok(ModuleDetails {
        module_path: vi.module_path.clone(),
        version: vi.version.clone(),
        packages,
    })
}

pub fn fetch_versions_details<S: DataSource + ?Sized>(
    store: &S,
    pkg: &VersionedPackage,
    now: DateTime<Utc>,
) -> Result<VersionsDetails, FrontendError> {
    let mut versions = store.get_package_versions(&pkg.package.path)?;
    versions.sort_by(|a, b| compare_versions(&b.version, &a.version));

    let mut groups: IndexMap<String, Vec<VersionSummary>> = IndexMap::new();
    for vi in versions {
        let key = major(&vi.version).unwrap_or_else(|| vi.version.clone());
        groups.entry(key).or_default().push(VersionSummary {
            commit_time: elapsed_time(vi.commit_time, now),
            module_path: vi.module_path,
            version: vi.version,
        });
    }

    Ok(VersionsDetails {
        groups: groups
            .into_iter()
            .map(|(major, versions)| MajorVersionGroup { major, versions })
            .collect(),
    })
}

pub fn fetch_imports_details<S: DataSource + ?Sized>(
    store: &S,
    pkg: &VersionedPackage,
) -> Result<ImportsDetails, FrontendError> {
    let imports = store.get_imports(&pkg.package.path, &pkg.version_info.version)?;
    let total = imports.len();
    let (std_lib, external_imports): (Vec<_>, Vec<_>) =
        imports.into_iter().partition(|p| in_std_lib(p));

    Ok(ImportsDetails {
        module_path: pkg.version_info.module_path.clone(),
        external_imports,
        std_lib,
        total,
    })
}

pub fn fetch_imported_by_details<S: DataSource + ?Sized>(
    store: &S,
    pkg: &VersionedPackage,
    params: PaginationParams,
) -> Result<ImportedByDetails, FrontendError> {
    let page = store.get_imported_by(&pkg.package.path, params.limit, params.offset())?;

    Ok(ImportedByDetails {
        module_path: pkg.version_info.module_path.clone(),
        imported_by: page.items,
        pagination: Pagination::new(params, page.total),
    })
}

pub fn fetch_package_licenses_details<S: DataSource + ?Sized>(
    store: &S,
    pkg: &VersionedPackage,
) -> Result<LicensesDetails, FrontendError> {
    let licenses = store.get_package_licenses(&pkg.package.path, &pkg.version_info.version)?;
    Ok(LicensesDetails {
        licenses: transform_licenses(&licenses),
    })
}

pub fn transform_licenses(licenses: &[License]) -> Vec<LicenseView> {
    licenses
        .iter()
        .map(|l| LicenseView {
            types: l.metadata.types.clone(),
            file_path: l.metadata.file_path.clone(),
            contents: l.contents.clone(),
        })
        .collect()
}
