//! Tania configuration.
//!
//! Configuration lives in /etc/tania/config.toml; every field has a
//! default so a missing or partial file still yields a working daemon.
//! `TANIA_CONFIG` overrides the file location for development.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// System configuration directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/tania";
const CONFIG_FILE: &str = "config.toml";

/// Tania data directory (catalog database)
pub const DATA_DIR: &str = "/var/lib/tania";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address for the HTTP API. Localhost only by default.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:7810".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite catalog database.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Seed an empty database with the built-in reference dataset.
    #[serde(default = "default_seed_on_empty")]
    pub seed_on_empty: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DATA_DIR).join("catalog.db")
}

fn default_seed_on_empty() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            seed_on_empty: default_seed_on_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaniaConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl TaniaConfig {
    /// Load from the system path (or `TANIA_CONFIG`), falling back to
    /// defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let path = std::env::var("TANIA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        "[CFG]  Bad config at {}: {} (using defaults)",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = TaniaConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:7810");
        assert!(config.database.seed_on_empty);
        assert!(config.database.path.ends_with("catalog.db"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: TaniaConfig =
            toml::from_str("[server]\nlisten_addr = \"0.0.0.0:8080\"\n").unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert!(config.database.seed_on_empty);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = TaniaConfig::load_from(Path::new("/nonexistent/tania.toml"));
        assert_eq!(config.server.listen_addr, "127.0.0.1:7810");
    }
}
