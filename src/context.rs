//! Shared application state
//!
//! One [`CockpitContext`] is built at startup and handed to every request
//! handler. All parts are internally synchronized.

use crate::bridge::{Connector, MemoryVariables, TcpConnector, VariableBridge, VariableMap};
use crate::config::AppConfig;
use crate::engine::ControlEngine;
use crate::headtrack::HeadTracker;
use crate::profile::{Profile, ProfileRegistry};
use anyhow::Context as _;
use std::sync::Arc;
use tracing::{info, warn};
use virjoy_device::{ActuationSink, AxisId, MemorySink, VirtualJoystick};

pub struct CockpitContext {
    pub profiles: ProfileRegistry,
    pub engine: ControlEngine,
    pub bridge: VariableBridge,
    pub headtrack: HeadTracker,
}

impl CockpitContext {
    pub fn new(
        profiles: ProfileRegistry,
        engine: ControlEngine,
        bridge: VariableBridge,
        headtrack: HeadTracker,
    ) -> Self {
        Self {
            profiles,
            engine,
            bridge,
            headtrack,
        }
    }

    /// Build everything from the configuration
    ///
    /// Missing devices and an unreachable variable service are not fatal;
    /// the affected requests fail instead. Broken profile or mapping files
    /// are.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let profiles = load_profiles(config)?;
        let engine = build_engine(config, &profiles);
        let bridge = build_bridge(config)?;
        let headtrack = HeadTracker::new(config.headtrack.clone());
        Ok(Self::new(profiles, engine, bridge, headtrack))
    }
}

/// Builtin profiles plus the configured profile directory and default
pub fn load_profiles(config: &AppConfig) -> anyhow::Result<ProfileRegistry> {
    let mut profiles = ProfileRegistry::with_builtins();
    if let Some(dir) = &config.profiles.directory {
        let loaded = profiles
            .load_from_directory(dir)
            .with_context(|| format!("Loading profiles from {}", dir.display()))?;
        info!("Loaded {} profile(s) from {}", loaded, dir.display());
    }
    if let Some(id) = &config.profiles.default {
        if !profiles.set_default(id) {
            warn!(
                "Default profile '{}' is not registered, keeping '{}'",
                id,
                profiles.default_id()
            );
        }
    }
    Ok(profiles)
}

/// Union of the axes any registered profile drives on one device
fn device_axes(profiles: &ProfileRegistry, axes: impl Fn(&Profile) -> Vec<AxisId>) -> Vec<AxisId> {
    let mut all: Vec<AxisId> = profiles
        .all_profiles()
        .iter()
        .flat_map(|p| axes(p))
        .collect();
    all.sort();
    all.dedup();
    all
}

fn open_sink(name: &str, axes: &[AxisId], dry_run: bool) -> Option<Box<dyn ActuationSink>> {
    if dry_run {
        info!("[dry-run] {} with axes {:?}", name, axes);
        return Some(Box::new(MemorySink::dry_run(name)));
    }
    match VirtualJoystick::new(name, axes) {
        Ok(joystick) => Some(Box::new(joystick)),
        Err(e) => {
            warn!("Cannot create {}: {}", name, e);
            None
        }
    }
}

fn build_engine(config: &AppConfig, profiles: &ProfileRegistry) -> ControlEngine {
    let devices = &config.devices;
    let cockpit = devices.cockpit.then(|| {
        let axes = device_axes(profiles, |p| p.axes.cockpit_axes());
        open_sink(&devices.cockpit_name, &axes, devices.dry_run)
    });
    let camera = devices.camera.then(|| {
        let axes = device_axes(profiles, |p| p.axes.camera_axes());
        open_sink(&devices.camera_name, &axes, devices.dry_run)
    });
    ControlEngine::new(cockpit.flatten(), camera.flatten())
}

/// Variable bridge for the configured service; opens no connection yet
pub fn build_bridge(config: &AppConfig) -> anyhow::Result<VariableBridge> {
    let bridge = &config.bridge;
    let map = VariableMap::load(&bridge.mapping)
        .with_context(|| format!("Loading variable mapping {}", bridge.mapping.display()))?;

    let connector: Option<Arc<dyn Connector>> = match &bridge.address {
        Some(addr) => Some(Arc::new(TcpConnector::new(addr.as_str()))),
        None if config.devices.dry_run => Some(Arc::new(MemoryVariables::dry_run())),
        None => None,
    };
    match &connector {
        Some(c) => info!("Variable service: {}", c.describe()),
        None => info!("No variable service configured"),
    }

    Ok(VariableBridge::new(map, connector).with_timeout(bridge.timeout()))
}
