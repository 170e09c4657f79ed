//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream stats-service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the data API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// How many history entries a single page fetch requests
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

fn default_api_key_env() -> String {
    "FACEIT_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://open.faceit.com/data/v4".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_history_limit() -> u32 {
    20
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            history_limit: default_history_limit(),
        }
    }
}

impl UpstreamConfig {
    /// Read the bearer token from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Per-namespace cache TTLs, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_identity_ttl")]
    pub identity_ttl_seconds: u64,

    #[serde(default = "default_history_ttl")]
    pub history_ttl_seconds: u64,

    /// Detail for a finished match never changes, hence the long TTL
    #[serde(default = "default_match_detail_ttl")]
    pub match_detail_ttl_seconds: u64,

    #[serde(default = "default_lifetime_ttl")]
    pub lifetime_ttl_seconds: u64,
}

fn default_identity_ttl() -> u64 {
    3600
}

fn default_history_ttl() -> u64 {
    1800
}

fn default_match_detail_ttl() -> u64 {
    86400
}

fn default_lifetime_ttl() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            identity_ttl_seconds: default_identity_ttl(),
            history_ttl_seconds: default_history_ttl(),
            match_detail_ttl_seconds: default_match_detail_ttl(),
            lifetime_ttl_seconds: default_lifetime_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn identity_ttl(&self) -> Duration {
        Duration::from_secs(self.identity_ttl_seconds)
    }

    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_seconds)
    }

    pub fn match_detail_ttl(&self) -> Duration {
        Duration::from_secs(self.match_detail_ttl_seconds)
    }

    pub fn lifetime_ttl(&self) -> Duration {
        Duration::from_secs(self.lifetime_ttl_seconds)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &PathBuf) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }

        if self.upstream.history_limit == 0 || self.upstream.history_limit > 100 {
            return Err(ConfigError::ValidationError(
                "History limit must be between 1 and 100".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.cache.identity_ttl_seconds == 0
            || self.cache.history_ttl_seconds == 0
            || self.cache.match_detail_ttl_seconds == 0
            || self.cache.lifetime_ttl_seconds == 0
        {
            return Err(ConfigError::ValidationError(
                "Cache TTLs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
