//! Runtime configuration for the synchronization service.
//!
//! Every field has a default, so a TOML file only needs the values it
//! overrides. `from_env` layers `COURTSIDE_*` variables over the defaults.

use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_LOCAL_MAX_SIZE_MB, DEFAULT_LOCAL_PATH, DEFAULT_LOG_FILTER,
    DEFAULT_NOTIFICATION_CAPACITY, DEFAULT_REFRESH_INTERVAL_MS, DEFAULT_REMOTE_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_WORKER_THREADS, ENV_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub cache_capacity: usize,
    pub refresh_interval_ms: u64,
    pub notification_capacity: usize,
    pub worker_threads: usize,
    pub log_filter: String,
    pub log_json: bool,
    pub remote: RemoteConfig,
    pub local: LocalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalConfig {
    pub path: PathBuf,
    pub max_size_mb: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            worker_threads: DEFAULT_WORKER_THREADS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_json: false,
            remote: RemoteConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOCAL_PATH),
            max_size_mb: DEFAULT_LOCAL_MAX_SIZE_MB,
        }
    }
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl SyncConfig {
    /// Load and validate a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Create SyncConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `COURTSIDE_CACHE_CAPACITY` (default: 5)
    /// - `COURTSIDE_REFRESH_INTERVAL_MS` (default: 5000)
    /// - `COURTSIDE_NOTIFICATION_CAPACITY` (default: 16)
    /// - `COURTSIDE_WORKER_THREADS` (default: 4)
    /// - `COURTSIDE_LOG_FILTER` (default: "info")
    /// - `COURTSIDE_LOG_JSON` (default: false)
    /// - `COURTSIDE_REMOTE_BASE_URL`
    /// - `COURTSIDE_REMOTE_TIMEOUT_MS` (default: 10000)
    /// - `COURTSIDE_LOCAL_PATH` (default: "courtside-data")
    /// - `COURTSIDE_LOCAL_MAX_SIZE_MB` (default: 64)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_capacity: env_parse("CACHE_CAPACITY").unwrap_or(defaults.cache_capacity),
            refresh_interval_ms: env_parse("REFRESH_INTERVAL_MS")
                .unwrap_or(defaults.refresh_interval_ms),
            notification_capacity: env_parse("NOTIFICATION_CAPACITY")
                .unwrap_or(defaults.notification_capacity),
            worker_threads: env_parse("WORKER_THREADS").unwrap_or(defaults.worker_threads),
            log_filter: env_var("LOG_FILTER").unwrap_or(defaults.log_filter),
            log_json: env_var("LOG_JSON")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(defaults.log_json),
            remote: RemoteConfig {
                base_url: env_var("REMOTE_BASE_URL").unwrap_or(defaults.remote.base_url),
                request_timeout_ms: env_parse("REMOTE_TIMEOUT_MS")
                    .unwrap_or(defaults.remote.request_timeout_ms),
            },
            local: LocalConfig {
                path: env_var("LOCAL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.local.path),
                max_size_mb: env_parse("LOCAL_MAX_SIZE_MB").unwrap_or(defaults.local.max_size_mb),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_capacity",
                reason: "must be > 0".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notification_capacity",
                reason: "must be > 0".to_string(),
            });
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "worker_threads",
                reason: "must be > 0".to_string(),
            });
        }
        if self.remote.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.remote.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.local.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "local.path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.local.max_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "local.max_size_mb",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}")).ok()
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|s| s.parse().ok())
}
