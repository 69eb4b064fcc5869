use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Pagination constants
// =============================================================================

/// Default number of dependents shown per page of the "importedby" tab
pub const DEFAULT_IMPORTED_BY_LIMIT: usize = 100;

/// Upper bound for a requested "importedby" page size
pub const MAX_IMPORTED_BY_LIMIT: usize = 1000;

const APP_NAME: &str = "pkgsite-details";

/// Configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Path to the SQLite database; defaults to `db_path()`
    pub database: Option<PathBuf>,
    pub imported_by: ImportedByConfig,
}

/// Pagination of the "importedby" tab
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportedByConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for ImportedByConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_IMPORTED_BY_LIMIT,
            max_limit: MAX_IMPORTED_BY_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Database path, falling back to the default location
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(db_path)
    }
}

/// Directory holding the default store database and the log file:
/// `$XDG_DATA_HOME/pkgsite-details`, then `~/.local/share/pkgsite-details`,
/// then `./pkgsite-details`.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Store database used when neither `--db` nor `database` is given
pub fn db_path() -> PathBuf {
    data_dir().join("pkgsite.db")
}

/// JSON log written by `logging::init_logging`
pub fn log_path() -> PathBuf {
    data_dir().join(format!("{APP_NAME}.log"))
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}
