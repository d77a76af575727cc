//! Application configuration
//!
//! Stored as TOML, by default at `~/.config/virjoy/virjoy.toml`. A missing
//! file yields the defaults; every section and field is optional.

use crate::headtrack::HeadTrackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Virtual joystick devices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub cockpit: bool,
    pub cockpit_name: String,
    pub camera: bool,
    pub camera_name: String,
    /// Log actuation instead of creating uinput devices
    pub dry_run: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            cockpit: true,
            cockpit_name: "VirJoy Cockpit".to_string(),
            camera: true,
            camera_name: "VirJoy Camera Head".to_string(),
            dry_run: false,
        }
    }
}

/// Aircraft profiles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Profile used when a request names none (or an unknown one)
    pub default: Option<String>,
    /// Extra JSON profiles, loaded after the builtins
    pub directory: Option<PathBuf>,
}

/// Simulator variable service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Companion address (`host:port`); no address means no service
    pub address: Option<String>,
    /// Key to variable mapping document
    pub mapping: PathBuf,
    pub timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: None,
            mapping: PathBuf::from("data/lvars.json"),
            timeout_ms: 2000,
        }
    }
}

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub devices: DeviceConfig,
    pub profiles: ProfilesConfig,
    pub bridge: BridgeConfig,
    pub headtrack: HeadTrackConfig,
}

impl AppConfig {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("virjoy")
            .join("virjoy.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
