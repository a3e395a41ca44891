//! Configuration loading and data root resolution
//!
//! Two sources feed the run configuration:
//! 1. **TOML bootstrap file** (optional): data root, catalog path, host, logging
//! 2. **Environment variables**: override any TOML value
//!
//! Priority order (highest first):
//! 1. Environment variable
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing TOML file is not an error; the run proceeds on defaults with a
//! warning. A TOML file that exists but does not parse is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Env var naming the data root (shared with the capture tooling)
pub const ENV_DATA_ROOT: &str = "REW_DATA_DIR";
/// Env var naming the catalog database file
pub const ENV_DATABASE: &str = "SWEEPDB_DATABASE";
/// Env var naming the provenance host
pub const ENV_HOST_NAME: &str = "SWEEPDB_HOST_NAME";
/// Env var naming the provenance host base URL
pub const ENV_BASE_URL: &str = "SWEEPDB_BASE_URL";
/// Env var pointing at an explicit TOML config file
pub const ENV_CONFIG_FILE: &str = "SWEEPDB_CONFIG";

const DEFAULT_HOST_NAME: &str = "MrWorldWide";
const DEFAULT_BASE_URL: &str = "http://placeholder.local";
const CATALOG_FILE_NAME: &str = "catalog.db";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; anything missing falls through to the
/// environment or the compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding `mdat/`, `json/`, `txt/` and `stepped-sine/`
    #[serde(default)]
    pub data_root: Option<PathBuf>,

    /// Path to the SQLite catalog file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Provenance host name recorded on every cataloged file
    #[serde(default)]
    pub host_name: Option<String>,

    /// Provenance host base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Provenance source for cataloged files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    pub host_name: String,
    pub base_url: String,
}

impl HostDescriptor {
    pub fn new(host_name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            base_url: base_url.into(),
        }
    }
}

impl Default for HostDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_HOST_NAME, DEFAULT_BASE_URL)
    }
}

/// Fully resolved configuration for one synchronization run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub data_root: PathBuf,
    pub database_path: PathBuf,
    pub host: HostDescriptor,
    pub log_level: String,
}

impl IngestConfig {
    /// Resolve configuration from the environment and the default TOML location
    pub fn load() -> Result<Self> {
        let toml_config = match config_file_path() {
            Some(path) => load_toml_config(&path)?,
            None => {
                warn!("No config file found, using environment and defaults");
                TomlConfig::default()
            }
        };
        Ok(Self::resolve(toml_config, |key| std::env::var(key).ok()))
    }

    /// Merge a TOML config with environment lookups
    ///
    /// `env` is injected so resolution can be tested without touching the
    /// process environment.
    pub fn resolve<F>(toml_config: TomlConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let data_root = non_empty(ENV_DATA_ROOT)
            .map(PathBuf::from)
            .or(toml_config.data_root)
            .unwrap_or_else(default_data_root);

        let database_path = non_empty(ENV_DATABASE)
            .map(PathBuf::from)
            .or(toml_config.database_path)
            .unwrap_or_else(|| data_root.join(CATALOG_FILE_NAME));

        let host_name = non_empty(ENV_HOST_NAME)
            .or(toml_config.host_name)
            .unwrap_or_else(|| DEFAULT_HOST_NAME.to_string());

        let base_url = non_empty(ENV_BASE_URL)
            .or(toml_config.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            data_root,
            database_path,
            host: HostDescriptor::new(host_name, base_url),
            log_level: toml_config.logging.level,
        }
    }
}

/// Parse a TOML config file
///
/// Missing file ⇒ defaults (with a warning). Present but invalid ⇒ error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found: {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Locate the TOML config file
///
/// `SWEEPDB_CONFIG` wins; otherwise `<config_dir>/sweepdb/config.toml` if it exists.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("sweepdb").join("config.toml"))
        .filter(|p| p.exists())
}

fn default_data_root() -> PathBuf {
    PathBuf::from("./data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let config = IngestConfig::resolve(TomlConfig::default(), env_from(&[]));
        assert_eq!(config.data_root, PathBuf::from("./data"));
        assert_eq!(config.database_path, PathBuf::from("./data/catalog.db"));
        assert_eq!(config.host, HostDescriptor::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_env_overrides_toml() {
        let toml_config = TomlConfig {
            data_root: Some(PathBuf::from("/toml/data")),
            host_name: Some("bench-a".to_string()),
            ..Default::default()
        };
        let config = IngestConfig::resolve(
            toml_config,
            env_from(&[(ENV_DATA_ROOT, "/env/data"), (ENV_BASE_URL, "http://bench.lan")]),
        );
        assert_eq!(config.data_root, PathBuf::from("/env/data"));
        assert_eq!(config.database_path, PathBuf::from("/env/data/catalog.db"));
        assert_eq!(config.host.host_name, "bench-a");
        assert_eq!(config.host.base_url, "http://bench.lan");
    }

    #[test]
    fn test_blank_env_value_is_ignored() {
        let toml_config = TomlConfig {
            database_path: Some(PathBuf::from("/srv/catalog.db")),
            ..Default::default()
        };
        let config = IngestConfig::resolve(toml_config, env_from(&[(ENV_DATABASE, "  ")]));
        assert_eq!(config.database_path, PathBuf::from("/srv/catalog.db"));
    }

    #[test]
    fn test_parse_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            data_root = "/var/lib/sweepdb"
            host_name = "lab-pc"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_root, Some(PathBuf::from("/var/lib/sweepdb")));
        assert_eq!(config.host_name.as_deref(), Some("lab-pc"));
        assert!(config.base_url.is_none());
        assert_eq!(config.logging.level, "debug");
    }
}
