//! Serve command implementation.

use crate::server::run_server;
use crate::utils::config::{ApiConfig, Config, DEFAULT_CONFIG_PATH};
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

/// Arguments for the serve command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ServeArgs {
    /// TOML config file (missing file means defaults)
    pub config: PathBuf,

    /// Overrides `api.address`
    pub address: Option<String>,

    /// Overrides `api.port`
    pub port: Option<u16>,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            address: None,
            port: None,
        }
    }
}

/// Load the config file and apply command-line overrides
///
/// **Public** - separated from execute_serve so it can be tested without a socket
///
/// # Errors
/// * Config file unreadable or invalid
/// * Zero timeout or zero body limit
pub fn resolve_config(args: &ServeArgs) -> Result<ApiConfig> {
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    let mut api = config.api;
    if let Some(address) = &args.address {
        api.address = address.clone();
    }
    if let Some(port) = args.port {
        api.port = port;
    }

    if api.address.is_empty() {
        anyhow::bail!("Listen address cannot be empty");
    }
    if api.request_timeout_secs == 0 {
        anyhow::bail!("request_timeout_secs must be greater than 0");
    }
    if api.body_limit == 0 {
        anyhow::bail!("body_limit must be greater than 0");
    }

    Ok(api)
}

/// Execute the serve command
///
/// **Public** - main entry point called from main.rs; blocks until shutdown
pub fn execute_serve(args: ServeArgs) -> Result<()> {
    let api = resolve_config(&args)?;

    info!(
        "Starting server on {} (timeout {}s, body limit {} bytes)",
        api.addr(),
        api.request_timeout_secs,
        api.body_limit
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run_server(api))
}
