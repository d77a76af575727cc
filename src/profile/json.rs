// JSON profile loader
// Load aircraft profiles from JSON files at runtime

use super::family::AircraftFamily;
use super::types::{
    AxisMap, ButtonMap, CameraSlot, FlapDetent, Profile, ReverseBehavior, ThrottleDetent,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use virjoy_device::MAX_BUTTONS;

/// Aircraft profile as stored on disk
///
/// Sections mirror the client-side profile documents: `ui` for what the
/// touchscreen shows, `mappings` for device indices, `backend` for the
/// server-side formulas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub family: AircraftFamily,
    #[serde(default)]
    pub ui: JsonUi,
    #[serde(default)]
    pub mappings: JsonMappings,
    #[serde(default)]
    pub backend: JsonBackend,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonUi {
    #[serde(default)]
    pub camera_config: Vec<CameraSlot>,
    #[serde(default)]
    pub flap_detents: Vec<FlapDetent>,
    #[serde(default)]
    pub throttle_detents: Vec<ThrottleDetent>,
    pub throttle_detent_snap: Option<f64>,
    pub control_sensitivity: Option<f64>,
    pub control_response: Option<f64>,
    pub reverse_behavior: Option<ReverseBehavior>,
    #[serde(default)]
    pub arm_spoilers_button: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonMappings {
    #[serde(default)]
    pub vjoy: ButtonMap,
    #[serde(default)]
    pub axes: AxisMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBackend {
    #[serde(default = "default_arm_spoiler_value")]
    pub arm_spoiler_value: f64,
}

impl Default for JsonBackend {
    fn default() -> Self {
        Self {
            arm_spoiler_value: default_arm_spoiler_value(),
        }
    }
}

fn default_arm_spoiler_value() -> f64 {
    0.11
}

impl JsonProfile {
    /// Load profile from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| LoadError::Io(e.to_string()))?;
        Self::load_from_json(&content)
    }

    /// Load profile from a JSON string
    pub fn load_from_json(json: &str) -> Result<Self, LoadError> {
        let profile: JsonProfile =
            serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Validate the profile data
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.id.trim().is_empty() {
            return Err(LoadError::Validation("profile id is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for cam in &self.ui.camera_config {
            if !seen.insert(cam.id) {
                return Err(LoadError::Validation(format!(
                    "duplicate camera id {}",
                    cam.id
                )));
            }
        }

        for detent in &self.ui.flap_detents {
            if !(0.0..=1.0).contains(&detent.value) {
                return Err(LoadError::Validation(format!(
                    "flap detent '{}' value {} outside 0..1",
                    detent.label, detent.value
                )));
            }
        }

        for detent in &self.ui.throttle_detents {
            if !(0.0..=1.0).contains(&detent.value) {
                return Err(LoadError::Validation(format!(
                    "throttle detent '{}' value {} outside 0..1",
                    detent.label, detent.value
                )));
            }
        }

        let b = &self.mappings.vjoy;
        let buttons = [
            ("PARKING_BRAKE", Some(b.parking_brake)),
            ("REVERSE_TOGGLE", Some(b.reverse_toggle)),
            ("IDLE_BUTTON", Some(b.idle_button)),
            ("GEAR_UP", Some(b.gear_up)),
            ("GEAR_DOWN", Some(b.gear_down)),
            ("CAM_BASE", Some(b.cam_base)),
            ("FLAPS_UP", Some(b.flaps_up)),
            ("FLAPS_DOWN", Some(b.flaps_down)),
            ("ARM_SPOILERS", b.arm_spoilers),
        ];
        for (name, button) in buttons {
            if let Some(button) = button {
                if button == 0 || button > MAX_BUTTONS {
                    return Err(LoadError::Validation(format!(
                        "{name} button {button} outside 1..={MAX_BUTTONS}"
                    )));
                }
            }
        }

        if self.ui.arm_spoilers_button && b.arm_spoilers.is_none() {
            return Err(LoadError::Validation(
                "arm_spoilers_button set but no ARM_SPOILERS mapping".to_string(),
            ));
        }

        Ok(())
    }
}

impl From<JsonProfile> for Profile {
    fn from(json: JsonProfile) -> Self {
        Profile {
            id: json.id,
            name: json.name,
            family: json.family,
            camera_config: json.ui.camera_config,
            flap_detents: json.ui.flap_detents,
            throttle_detents: json.ui.throttle_detents,
            throttle_detent_snap: json.ui.throttle_detent_snap,
            control_sensitivity: json.ui.control_sensitivity.unwrap_or(1.0),
            control_response: json.ui.control_response.unwrap_or(1.0),
            reverse_behavior: json.ui.reverse_behavior.unwrap_or_default(),
            arm_spoilers_button: json.ui.arm_spoilers_button,
            arm_spoiler_value: json.backend.arm_spoiler_value,
            buttons: json.mappings.vjoy,
            axes: json.mappings.axes,
        }
    }
}

/// Profile loading errors
#[derive(Debug, Clone)]
pub enum LoadError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "IO error: {e}"),
            LoadError::Parse(e) => write!(f, "Parse error: {e}"),
            LoadError::Validation(e) => write!(f, "Validation error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}
