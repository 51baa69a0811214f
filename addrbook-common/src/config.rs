//! Configuration loading and database path resolution
//!
//! Settings come from an optional TOML file. A missing file is not an
//! error: the service logs a warning and starts on compiled defaults.
//! A file that exists but fails to parse is reported as
//! [`Error::Config`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "ADDRBOOK_CONFIG";

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "ADDRBOOK_DATABASE";

const APP_DIR: &str = "addrbook";
const DATABASE_FILE: &str = "addrbook.db";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level TOML configuration
///
/// ```toml
/// [server]
/// bind_address = "127.0.0.1:8000"
/// cors_origins = ["http://localhost", "http://localhost:8080"]
///
/// [database]
/// path = "/var/lib/addrbook/addrbook.db"
///
/// [logging]
/// level = "info"
///
/// [api]
/// empty_list_is_not_found = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to
    pub bind_address: String,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            cors_origins: vec![
                "http://localhost".to_string(),
                "http://localhost:8080".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file; platform default when absent
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Answer `GET /address` on an empty store with 404 instead of `[]`
    pub empty_list_is_not_found: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            empty_list_is_not_found: true,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the located config file, or compiled defaults when there is none
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match locate_config_file(explicit) {
            Some(path) => {
                let config = Self::load(&path)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        self.bind_address()?;

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Unknown log level '{}', expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Parsed listener address
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server.bind_address.parse().map_err(|e| {
            Error::InvalidInput(format!(
                "Invalid bind address '{}': {}",
                self.server.bind_address, e
            ))
        })
    }
}

/// Find the config file to load
///
/// Lookup order: `explicit` path (CLI or `ADDRBOOK_CONFIG`), then
/// [`default_config_path`]. Returns `None` when the chosen file does not
/// exist, in which case the caller runs on defaults.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if path.exists() {
        Some(path)
    } else {
        warn!("Config file not found: {} (using defaults)", path.display());
        None
    }
}

/// Per-user config file location (`<config dir>/addrbook/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./addrbook_data"))
        .join(DATABASE_FILE)
}

/// Resolve the database path
///
/// Priority order:
/// 1. Command-line argument (highest priority)
/// 2. `ADDRBOOK_DATABASE` environment variable
/// 3. `[database] path` from the TOML config
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database.path {
        return path.clone();
    }

    default_database_path()
}
