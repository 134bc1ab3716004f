//! Configuration and constants for the server and CLI.
//!
//! Server settings come from a TOML file with an `[api]` table:
//!
//! ```toml
//! [api]
//! address = "0.0.0.0"
//! port = 8080
//! request_timeout_secs = 30
//! body_limit = 10485760
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use super::error::ConfigError;
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default config file looked up by `serve`
pub const DEFAULT_CONFIG_PATH: &str = "app.toml";

pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024; // 10 MiB

/// Versioned prefix for all API routes
pub const API_PREFIX: &str = "/api/v1";

// Reserved keys of the input document
pub const DATA_KEY: &str = "data";
pub const COUNT_KEY: &str = "count";

/// Application-wide configuration (one table per concern)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Interface to bind
    pub address: String,

    /// TCP port to bind
    pub port: u16,

    /// Upper bound for a whole request, body included
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes
    pub body_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Listen address in `address:port` form
    pub fn addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// **Public** - called by the `serve` command
    ///
    /// # Arguments
    /// * `path` - Path to the TOML file
    ///
    /// # Returns
    /// Parsed configuration, or defaults if the file does not exist
    ///
    /// # Errors
    /// * `ConfigError::ReadFailed` - File exists but cannot be read
    /// * `ConfigError::Invalid` - File is not valid TOML for this schema
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_toml(&raw).map_err(|source| ConfigError::Invalid {
            path: path.display().to_string(),
            source,
        })?;

        info!("Using config file: {}", path.display());
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
