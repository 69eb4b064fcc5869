use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::license::{License, Metadata};
use crate::module::find_latest;
use crate::store::error::StoreError;
use crate::store::source::DataSource;
use crate::store::types::{Package, Page, VersionInfo, VersionedPackage};

/// Schema migrations applied on top of the base schema, in order.
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[];

const VERSION_COLUMNS: &str = "v.module_path, v.version, v.commit_time, v.repository_url, \
     v.readme_file_path, v.readme_contents";

/// SQLite-backed module and package store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Opening store database at {:?}", db_path);

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        info!("Store initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS versions (
                module_path TEXT NOT NULL,
                version TEXT NOT NULL,
                commit_time TEXT NOT NULL,
                repository_url TEXT NOT NULL DEFAULT '',
                readme_file_path TEXT NOT NULL DEFAULT '',
                readme_contents TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (module_path, version)
            );

            CREATE TABLE IF NOT EXISTS packages (
                path TEXT NOT NULL,
                module_path TEXT NOT NULL,
                version TEXT NOT NULL,
                name TEXT NOT NULL,
                synopsis TEXT NOT NULL DEFAULT '',
                documentation TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (path, version),
                FOREIGN KEY (module_path, version)
                    REFERENCES versions(module_path, version) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_packages_module
                ON packages(module_path, version);

            CREATE TABLE IF NOT EXISTS licenses (
                module_path TEXT NOT NULL,
                version TEXT NOT NULL,
                file_path TEXT NOT NULL,
                types TEXT NOT NULL,
                contents TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (module_path, version, file_path),
                FOREIGN KEY (module_path, version)
                    REFERENCES versions(module_path, version) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS imports (
                from_path TEXT NOT NULL,
                from_version TEXT NOT NULL,
                to_path TEXT NOT NULL,
                PRIMARY KEY (from_path, from_version, to_path),
                FOREIGN KEY (from_path, from_version)
                    REFERENCES packages(path, version) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_imports_to_path ON imports(to_path);
            "#,
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    conn.execute(sql, [])?;
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
        }

        Ok(())
    }

    /// Insert or replace a module version
    pub fn insert_version(&self, vi: &VersionInfo) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO versions
                (module_path, version, commit_time, repository_url, readme_file_path, readme_contents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            (
                &vi.module_path,
                &vi.version,
                vi.commit_time.to_rfc3339(),
                &vi.repository_url,
                &vi.readme_file_path,
                &vi.readme_contents,
            ),
        )?;
        Ok(())
    }

    /// Insert or replace a package of an existing module version.
    ///
    /// `pkg.licenses` is ignored: package licenses are derived from the
    /// module's license files.
    pub fn insert_package(
        &self,
        module_path: &str,
        version: &str,
        pkg: &Package,
    ) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO packages
                (path, module_path, version, name, synopsis, documentation)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            (
                &pkg.path,
                module_path,
                version,
                &pkg.name,
                &pkg.synopsis,
                &pkg.documentation_html,
            ),
        )?;
        Ok(())
    }

    /// Insert or replace a license file of an existing module version
    pub fn insert_license(
        &self,
        module_path: &str,
        version: &str,
        license: &License,
    ) -> Result<(), StoreError> {
        let types = serde_json::to_string(&license.metadata.types)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO licenses (module_path, version, file_path, types, contents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            (
                module_path,
                version,
                &license.metadata.file_path,
                types,
                &license.contents,
            ),
        )?;
        Ok(())
    }

    /// Record that the package `from_path` at `from_version` imports `to_path`
    pub fn insert_import(
        &self,
        from_path: &str,
        from_version: &str,
        to_path: &str,
    ) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO imports (from_path, from_version, to_path) VALUES (?1, ?2, ?3)",
            (from_path, from_version, to_path),
        )?;
        Ok(())
    }
}

/// Clamp a count to the range of SQLite integers
fn sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn parse_commit_time(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("commit time {raw:?}: {e}")))
}

fn parse_license_types(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::InvalidData(format!("license types {raw:?}: {e}")))
}

/// Raw version row; the commit time is parsed after the row is read
struct VersionRow {
    module_path: String,
    version: String,
    commit_time: String,
    repository_url: String,
    readme_file_path: String,
    readme_contents: String,
}

impl VersionRow {
    /// Reads the `VERSION_COLUMNS` starting at column `start`
    fn read(row: &Row<'_>, start: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            module_path: row.get(start)?,
            version: row.get(start + 1)?,
            commit_time: row.get(start + 2)?,
            repository_url: row.get(start + 3)?,
            readme_file_path: row.get(start + 4)?,
            readme_contents: row.get(start + 5)?,
        })
    }

    fn into_version_info(self) -> Result<VersionInfo, StoreError> {
        Ok(VersionInfo {
            commit_time: parse_commit_time(&self.commit_time)?,
            module_path: self.module_path,
            version: self.version,
            repository_url: self.repository_url,
            readme_file_path: self.readme_file_path,
            readme_contents: self.readme_contents,
        })
    }
}

/// Reports whether a license found in `license_dir` covers the package at
/// `package_path` inside the module at `module_path`.
fn license_applies(license_dir: &str, module_path: &str, package_path: &str) -> bool {
    if license_dir == "." {
        return true;
    }
    let suffix = package_path
        .strip_prefix(module_path)
        .map(|s| s.trim_start_matches('/'))
        .unwrap_or(package_path);
    suffix == license_dir
        || suffix
            .strip_prefix(license_dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn query_module_licenses(
    conn: &Connection,
    module_path: &str,
    version: &str,
) -> Result<Vec<License>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT file_path, types, contents FROM licenses
        WHERE module_path = ?1 AND version = ?2
        ORDER BY file_path
        "#,
    )?;
    let rows = stmt
        .query_map((module_path, version), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(file_path, types, contents)| {
            Ok(License {
                metadata: Metadata {
                    types: parse_license_types(&types)?,
                    file_path,
                },
                contents,
            })
        })
        .collect()
}

fn licenses_for_package(
    licenses: &[License],
    module_path: &str,
    package_path: &str,
) -> Vec<License> {
    licenses
        .iter()
        .filter(|l| license_applies(l.metadata.dir(), module_path, package_path))
        .cloned()
        .collect()
}

fn query_package(
    conn: &Connection,
    path: &str,
    version: &str,
) -> Result<VersionedPackage, StoreError> {
    let sql = format!(
        r#"
        SELECT p.path, p.name, p.synopsis, p.documentation, {VERSION_COLUMNS}
        FROM packages p
        JOIN versions v ON p.module_path = v.module_path AND p.version = v.version
        WHERE p.path = ?1 AND p.version = ?2
        "#
    );
    let row = conn
        .query_row(&sql, (path, version), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                VersionRow::read(row, 4)?,
            ))
        })
        .optional()?;

    let Some((path, name, synopsis, documentation_html, version_row)) = row else {
        return Err(StoreError::NotFound(format!("package {path}@{version}")));
    };

    let version_info = version_row.into_version_info()?;
    let module_licenses =
        query_module_licenses(conn, &version_info.module_path, &version_info.version)?;
    let licenses = licenses_for_package(&module_licenses, &version_info.module_path, &path)
        .into_iter()
        .map(|l| l.metadata)
        .collect();

    Ok(VersionedPackage {
        package: Package {
            path,
            name,
            synopsis,
            licenses,
            documentation_html,
        },
        version_info,
    })
}

impl DataSource for SqliteStore {
    fn get_latest_package(&self, path: &str) -> Result<VersionedPackage, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT version FROM packages WHERE path = ?1")?;
        let versions = stmt
            .query_map([path], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let Some(latest) = find_latest(versions.iter().map(String::as_str)) else {
            return Err(StoreError::NotFound(format!("package {path}")));
        };
        debug!("Latest version of {} is {}", path, latest);

        query_package(&conn, path, latest)
    }

    fn get_package(&self, path: &str, version: &str) -> Result<VersionedPackage, StoreError> {
        let conn = self.lock_conn()?;
        query_package(&conn, path, version)
    }

    fn get_version_info(
        &self,
        module_path: &str,
        version: &str,
    ) -> Result<VersionInfo, StoreError> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM versions v WHERE v.module_path = ?1 AND v.version = ?2"
        );
        let row = conn
            .query_row(&sql, (module_path, version), |row| VersionRow::read(row, 0))
            .optional()?;

        match row {
            Some(row) => row.into_version_info(),
            None => Err(StoreError::NotFound(format!(
                "module {module_path}@{version}"
            ))),
        }
    }

    fn get_module_licenses(
        &self,
        module_path: &str,
        version: &str,
    ) -> Result<Vec<License>, StoreError> {
        let conn = self.lock_conn()?;
        query_module_licenses(&conn, module_path, version)
    }

    fn get_version_packages(
        &self,
        module_path: &str,
        version: &str,
    ) -> Result<Vec<Package>, StoreError> {
        let conn = self.lock_conn()?;
        let module_licenses = query_module_licenses(&conn, module_path, version)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT path, name, synopsis, documentation FROM packages
            WHERE module_path = ?1 AND version = ?2
            ORDER BY path
            "#,
        )?;
        let packages = stmt
            .query_map((module_path, version), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|(path, name, synopsis, documentation_html)| {
                let licenses = licenses_for_package(&module_licenses, module_path, &path)
                    .into_iter()
                    .map(|l| l.metadata)
                    .collect();
                Package {
                    path,
                    name,
                    synopsis,
                    licenses,
                    documentation_html,
                }
            })
            .collect();

        Ok(packages)
    }

    fn get_package_versions(&self, path: &str) -> Result<Vec<VersionInfo>, StoreError> {
        let conn = self.lock_conn()?;
        let sql = format!(
            r#"
            SELECT {VERSION_COLUMNS} FROM versions v
            JOIN packages p ON p.module_path = v.module_path AND p.version = v.version
            WHERE p.path = ?1
            "#
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([path], |row| VersionRow::read(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(VersionRow::into_version_info).collect()
    }

    fn get_imports(&self, path: &str, version: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT to_path FROM imports WHERE from_path = ?1 AND from_version = ?2 ORDER BY to_path",
        )?;
        let imports = stmt
            .query_map((path, version), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(imports)
    }

    fn get_imported_by(
        &self,
        path: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<String>, StoreError> {
        let conn = self.lock_conn()?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT from_path) FROM imports WHERE to_path = ?1",
            [path],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT from_path FROM imports
            WHERE to_path = ?1
            ORDER BY from_path
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let items = stmt
            .query_map((path, sql_int(limit), sql_int(offset)), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(Page {
            items,
            total: total as usize,
        })
    }

    fn get_package_licenses(
        &self,
        path: &str,
        version: &str,
    ) -> Result<Vec<License>, StoreError> {
        let conn = self.lock_conn()?;
        let module_path: Option<String> = conn
            .query_row(
                "SELECT module_path FROM packages WHERE path = ?1 AND version = ?2",
                (path, version),
                |row| row.get(0),
            )
            .optional()?;

        let Some(module_path) = module_path else {
            return Err(StoreError::NotFound(format!("package {path}@{version}")));
        };

        let module_licenses = query_module_licenses(&conn, &module_path, version)?;
        Ok(licenses_for_package(&module_licenses, &module_path, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".", "example.com/m", "example.com/m", true)]
    #[case(".", "example.com/m", "example.com/m/a/b", true)]
    #[case("a", "example.com/m", "example.com/m/a", true)]
    #[case("a", "example.com/m", "example.com/m/a/b", true)]
    #[case("a", "example.com/m", "example.com/m/ab", false)]
    #[case("a/b", "example.com/m", "example.com/m/a", false)]
    #[case("a", "example.com/m", "example.com/m", false)]
    fn license_applies_returns_expected(
        #[case] license_dir: &str,
        #[case] module_path: &str,
        #[case] package_path: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            license_applies(license_dir, module_path, package_path),
            expected
        );
    }

    #[test]
    fn parse_commit_time_rejects_garbage() {
        assert!(matches!(
            parse_commit_time("yesterday"),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1000, 1000)]
    #[case(usize::MAX, i64::MAX)]
    fn sql_int_clamps_to_i64(#[case] n: usize, #[case] expected: i64) {
        assert_eq!(sql_int(n), expected);
    }

    #[test]
    fn new_creates_reverse_import_index_in_base_schema() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = SqliteStore::new(&temp_dir.path().join("schema.db")).unwrap();
        let conn = store.lock_conn().unwrap();

        let index: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'index' AND name = 'idx_imports_to_path'",
                [],
                |row| row.get(0),
            )
            .optional()
            .unwrap();
        let user_version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();

        assert_eq!(index.as_deref(), Some("idx_imports_to_path"));
        assert_eq!(user_version, 0);
    }
}
