//! Command handlers for the CLI application.
//!
//! - `serve`: the HTTP server (default command)
//! - `inspect`: one-shot commands (profiles, vars, decode, config)

pub mod inspect;
pub mod serve;

use anyhow::Context as _;
use std::path::PathBuf;
use virjoy::config::AppConfig;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Config file path plus the loaded config with CLI overrides applied
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: AppConfig,
}

/// Load the config file and apply command-line overrides
pub fn load_config(
    path: Option<PathBuf>,
    port: Option<u16>,
    dry_run: bool,
) -> anyhow::Result<LoadedConfig> {
    let path = path.unwrap_or_else(AppConfig::default_path);
    tracing::info!("Loading config from {:?}", path);
    let mut config =
        AppConfig::load(&path).with_context(|| format!("Reading {}", path.display()))?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if dry_run {
        config.devices.dry_run = true;
    }
    Ok(LoadedConfig { path, config })
}
