//! Configuration loading
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_COMPARATOR_TIMEOUT_MS: u64 = 30_000;

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub comparator: ComparatorConfig,
}

/// Scene comparator settings.
///
/// With no endpoint configured the server falls back to the deterministic
/// offline comparator, mirroring the keyless operation of the hosted
/// vision API.
#[derive(Debug, Clone)]
pub struct ComparatorConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Per-invocation deadline; exceeding it degrades the tuple to zero
    /// findings unless the rule is required
    pub timeout_ms: u64,
    /// Treat every upstream failure as fatal (persistent-outage policy)
    pub fail_fast: bool,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_ms: DEFAULT_COMPARATOR_TIMEOUT_MS,
            fail_fast: false,
        }
    }
}

/// Command-line overrides passed down from the binary's clap parser
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
}

/// On-disk TOML shape
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
    #[serde(default)]
    comparator: FileComparatorConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FileComparatorConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout_ms: Option<u64>,
    fail_fast: Option<bool>,
}

impl ServerConfig {
    /// Load configuration applying the priority order above
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let file = match config_file_path(overrides.config_file.as_deref()) {
            Some(path) => read_config_file(&path)?,
            None => FileConfig::default(),
        };

        let host = overrides
            .host
            .clone()
            .or_else(|| std::env::var("REELCHECK_HOST").ok())
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => match std::env::var("REELCHECK_PORT") {
                Ok(value) => value
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid REELCHECK_PORT '{}': {}", value, e)))?,
                Err(_) => file.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let database_path = overrides
            .database
            .clone()
            .or_else(|| std::env::var("REELCHECK_DATABASE").ok().map(PathBuf::from))
            .or(file.database)
            .unwrap_or_else(default_database_path);

        let timeout_ms = match std::env::var("REELCHECK_COMPARATOR_TIMEOUT_MS") {
            Ok(value) => value.parse().map_err(|e| {
                Error::Config(format!(
                    "Invalid REELCHECK_COMPARATOR_TIMEOUT_MS '{}': {}",
                    value, e
                ))
            })?,
            Err(_) => file
                .comparator
                .timeout_ms
                .unwrap_or(DEFAULT_COMPARATOR_TIMEOUT_MS),
        };

        let comparator = ComparatorConfig {
            endpoint: std::env::var("REELCHECK_VISION_ENDPOINT")
                .ok()
                .or(file.comparator.endpoint),
            api_key: std::env::var("REELCHECK_VISION_API_KEY")
                .ok()
                .or(file.comparator.api_key),
            timeout_ms,
            fail_fast: match std::env::var("REELCHECK_COMPARATOR_FAIL_FAST") {
                Ok(value) => value == "1" || value.eq_ignore_ascii_case("true"),
                Err(_) => file.comparator.fail_fast.unwrap_or(false),
            },
        };

        Ok(Self {
            host,
            port,
            database_path,
            comparator,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Pick the config file: explicit path, then the user config directory,
/// then the system-wide location.
fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = dirs::config_dir().map(|d| d.join("reelcheck").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }
    let system = PathBuf::from("/etc/reelcheck/config.toml");
    if system.exists() {
        return Some(system);
    }
    None
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelcheck")
        .join("reelcheck.db")
}
