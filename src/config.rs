use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::attendance::GridWindow;
use crate::models::CourseCatalog;
use crate::storage::{DEFAULT_BUCKET, StorageConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read course catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse course catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub storage: Option<StorageConfig>,
    pub catalog_path: Option<PathBuf>,
    pub grid_window: GridWindow,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| "sqlite://studentdesk.db".to_string());

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let storage = match (get("STORAGE_URL"), get("STORAGE_KEY")) {
            (Some(base_url), Some(api_key)) => Some(StorageConfig {
                base_url,
                api_key,
                bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            }),
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_KEY",
                    reason: "must be set when STORAGE_URL is set".to_string(),
                });
            }
            _ => None,
        };

        let grid_window = match get("GRID_WINDOW") {
            Some(raw) => raw
                .parse()
                .map_err(|reason| ConfigError::Invalid { key: "GRID_WINDOW", reason })?,
            None => GridWindow::default(),
        };

        Ok(Self {
            database_url,
            bind_addr,
            storage,
            catalog_path: get("COURSE_CATALOG_PATH").map(PathBuf::from),
            grid_window,
        })
    }

    pub fn load_catalog(&self) -> Result<CourseCatalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => load_catalog(path),
            None => Ok(CourseCatalog::default()),
        }
    }
}

pub fn load_catalog(path: &Path) -> Result<CourseCatalog, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::CatalogParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.database_url, "sqlite://studentdesk.db");
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert!(cfg.storage.is_none());
        assert_eq!(cfg.grid_window, GridWindow::Fixed(30));
        assert_eq!(cfg.load_catalog().unwrap(), CourseCatalog::default());
    }

    #[test]
    fn storage_requires_key_with_url() {
        assert!(config(&[("STORAGE_URL", "https://x.supabase.co")]).is_err());

        let cfg = config(&[("STORAGE_URL", "https://x.supabase.co"), ("STORAGE_KEY", "k")]).unwrap();
        let storage = cfg.storage.unwrap();
        assert_eq!(storage.bucket, "student_pictures");
    }

    #[test]
    fn grid_window_and_bind_addr_are_validated() {
        let cfg = config(&[("GRID_WINDOW", "month"), ("BIND_ADDR", "0.0.0.0:8080")]).unwrap();
        assert_eq!(cfg.grid_window, GridWindow::CalendarMonth);
        assert_eq!(cfg.bind_addr.port(), 8080);

        assert!(config(&[("GRID_WINDOW", "fortnight")]).is_err());
        assert!(config(&[("BIND_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn missing_catalog_file_is_reported() {
        let err = load_catalog(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, ConfigError::CatalogIo { .. }));
    }
}
