//! Store test utilities

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use pkgsite_details::config::ImportedByConfig;
use pkgsite_details::frontend::{Server, TabRegistries};
use pkgsite_details::license::{License, Metadata};
use pkgsite_details::store::{Package, SqliteStore, VersionInfo};

pub const MODULE: &str = "example.com/mod";
pub const CLOSED_MODULE: &str = "example.com/closed";
pub const APP_MODULE: &str = "example.org/app";

/// Fixed "now" used for relative commit times
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 8, 20, 12, 0, 0).unwrap()
}

pub fn version_info(module_path: &str, version: &str, age: Duration) -> VersionInfo {
    VersionInfo {
        module_path: module_path.to_string(),
        version: version.to_string(),
        commit_time: fixed_now() - age,
        repository_url: format!("https://{module_path}"),
        readme_file_path: "README.md".to_string(),
        readme_contents: format!("# {module_path} {version}"),
    }
}

pub fn package(path: &str, name: &str) -> Package {
    Package {
        path: path.to_string(),
        name: name.to_string(),
        synopsis: format!("Package {name} synopsis."),
        licenses: vec![],
        documentation_html: format!("<p>Documentation for {path}.</p>"),
    }
}

pub fn license(types: &[&str], file_path: &str) -> License {
    License {
        metadata: Metadata::new(types, file_path),
        contents: format!("{} license text", types.join(" ")),
    }
}

fn seed_module(
    store: &SqliteStore,
    vi: &VersionInfo,
    packages: &[Package],
    licenses: &[License],
) {
    store.insert_version(vi).unwrap();
    for pkg in packages {
        store.insert_package(&vi.module_path, &vi.version, pkg).unwrap();
    }
    for l in licenses {
        store.insert_license(&vi.module_path, &vi.version, l).unwrap();
    }
}

/// Create a store with:
/// - example.com/mod at v1.0.0, v1.1.0 and v1.2.0-beta.1, MIT licensed at the
///   root and with an unrecognized license under closed/
/// - example.com/closed at v0.1.0 without any license
/// - example.org/app at v0.1.0, whose packages import example.com/mod
pub fn create_test_store() -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::new(&db_path).unwrap();

    let mod_packages = [
        package(MODULE, "mod"),
        package(&format!("{MODULE}/cmd/tool"), "main"),
        package(&format!("{MODULE}/closed"), "closed"),
    ];
    let mod_licenses = [
        license(&["MIT"], "LICENSE"),
        license(&[], "closed/LICENSE"),
    ];
    for (version, age) in [
        ("v1.0.0", Duration::days(40)),
        ("v1.1.0", Duration::days(3)),
        ("v1.2.0-beta.1", Duration::hours(2)),
    ] {
        seed_module(
            &store,
            &version_info(MODULE, version, age),
            &mod_packages,
            &mod_licenses,
        );
    }

    seed_module(
        &store,
        &version_info(CLOSED_MODULE, "v0.1.0", Duration::days(1)),
        &[package(&format!("{CLOSED_MODULE}/lib"), "lib")],
        &[],
    );

    let app_packages = [
        package(&format!("{APP_MODULE}/a"), "a"),
        package(&format!("{APP_MODULE}/b"), "b"),
        package(&format!("{APP_MODULE}/c"), "c"),
    ];
    seed_module(
        &store,
        &version_info(APP_MODULE, "v0.1.0", Duration::days(10)),
        &app_packages,
        &[license(&["Apache-2.0"], "LICENSE")],
    );
    for pkg in &app_packages {
        store.insert_import(&pkg.path, "v0.1.0", MODULE).unwrap();
    }

    for to_path in ["fmt", MODULE, "golang.org/x/text", "os"] {
        store
            .insert_import(&format!("{MODULE}/cmd/tool"), "v1.1.0", to_path)
            .unwrap();
    }

    (temp_dir, Arc::new(store))
}

/// Create a server over `store` with a fixed clock
pub fn create_test_server(store: Arc<SqliteStore>) -> Server<SqliteStore> {
    Server::new(
        store,
        Arc::new(TabRegistries::new().unwrap()),
        ImportedByConfig::default(),
    )
    .with_clock(fixed_now)
}
