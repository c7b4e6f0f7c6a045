//! Configuration for opening a tunnel store.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::kv::{FileKv, KeyValueStore, MemoryKv, SqliteKv};
use crate::store::TunnelStore;

/// SQLite database file name inside the data directory.
pub const SQLITE_FILE_NAME: &str = "tunnel-store.db";

/// JSON document file name inside the data directory.
pub const JSON_FILE_NAME: &str = "tunnel-store.json";

/// Which medium the store is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Sqlite,
    File,
    /// Not durable. Useful for tests and dry runs.
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" | "json" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown tunnel store backend: {other}"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sqlite => "sqlite",
            Self::File => "file",
            Self::Memory => "memory",
        })
    }
}

/// Tunnel store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the state file.
    pub data_dir: PathBuf,

    /// Storage medium.
    pub backend: Backend,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of compact text.
    pub log_json: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tunnel-state"),
            backend: Backend::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("TUNNEL_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let backend = match lookup("TUNNEL_STORE_BACKEND") {
            Some(s) => s.parse::<Backend>().context("invalid TUNNEL_STORE_BACKEND")?,
            None => defaults.backend,
        };

        let log_level = lookup("TUNNEL_STORE_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_json = lookup("TUNNEL_STORE_LOG_JSON")
            .map(|s| matches!(s.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(defaults.log_json);

        Ok(Self {
            data_dir,
            backend,
            log_level,
            log_json,
        })
    }

    /// Path of the state file for the configured backend, if it has one.
    pub fn state_path(&self) -> Option<PathBuf> {
        match self.backend {
            Backend::Sqlite => Some(self.data_dir.join(SQLITE_FILE_NAME)),
            Backend::File => Some(self.data_dir.join(JSON_FILE_NAME)),
            Backend::Memory => None,
        }
    }

    /// Open the configured medium and wrap it in a tunnel store.
    pub fn open(&self) -> Result<TunnelStore<Box<dyn KeyValueStore>>> {
        if self.backend != Backend::Memory {
            fs::create_dir_all(&self.data_dir).with_context(|| {
                format!("Failed to create data directory: {}", self.data_dir.display())
            })?;
        }

        let kv: Box<dyn KeyValueStore> = match self.backend {
            Backend::Sqlite => {
                let path = self.data_dir.join(SQLITE_FILE_NAME);
                let kv = SqliteKv::open(&path).with_context(|| {
                    format!("Failed to open tunnel store database: {}", path.display())
                })?;
                Box::new(kv)
            }
            Backend::File => Box::new(FileKv::new(self.data_dir.join(JSON_FILE_NAME))),
            Backend::Memory => Box::new(MemoryKv::new()),
        };

        info!(
            backend = %self.backend,
            data_dir = %self.data_dir.display(),
            "Opening tunnel store"
        );

        Ok(TunnelStore::new(kv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.data_dir, PathBuf::from("./tunnel-state"));
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_config_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("TUNNEL_STORE_DIR", "/data/vpn"),
            ("TUNNEL_STORE_BACKEND", "File"),
            ("TUNNEL_STORE_LOG_LEVEL", "debug"),
            ("TUNNEL_STORE_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::File);
        assert_eq!(
            config.state_path(),
            Some(PathBuf::from("/data/vpn/tunnel-store.json"))
        );
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
    }

    #[test]
    fn test_config_unknown_backend() {
        let err = StoreConfig::from_lookup(lookup(&[("TUNNEL_STORE_BACKEND", "redis")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("redis"));
    }

    #[test]
    fn test_memory_backend_has_no_path() {
        let config = StoreConfig {
            backend: Backend::Memory,
            ..StoreConfig::default()
        };
        assert!(config.state_path().is_none());

        let store = config.open().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
