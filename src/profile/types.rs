// Aircraft profile types
// Static per-aircraft data: UI slots, detents, response tuning, index tables

use super::family::AircraftFamily;
use serde::{Deserialize, Serialize};
use virjoy_device::AxisId;

/// A selectable camera view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSlot {
    pub id: u8,
    pub name: String,
}

/// A flap lever detent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlapDetent {
    pub index: u8,
    pub label: String,
    /// Normalized lever position (0..1)
    #[serde(rename = "val")]
    pub value: f64,
}

/// A throttle gate (CLB, FLX/MCT, TO/GA...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleDetent {
    pub label: String,
    #[serde(rename = "val")]
    pub value: f64,
}

/// Reverse-thrust and idle behavior of the throttle quadrant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseBehavior {
    /// Time the engines need to spool down before reverse engages
    #[serde(default)]
    pub spool_down_ms: u32,
    /// Lowest forward-thrust value sent to the sim
    pub idle_floor: f64,
    /// Throttle value at reverse idle
    pub idle_rev: f64,
    #[serde(default)]
    pub idle_bump_up: f64,
    #[serde(default)]
    pub idle_bump_ms: u32,
    #[serde(default)]
    pub idle_bump_down: f64,
}

impl Default for ReverseBehavior {
    fn default() -> Self {
        Self {
            spool_down_ms: 0,
            idle_floor: 0.007,
            idle_rev: 0.0069,
            idle_bump_up: 0.0,
            idle_bump_ms: 0,
            idle_bump_down: 0.0,
        }
    }
}

/// Logical button name -> physical button index on the cockpit device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ButtonMap {
    pub parking_brake: u8,
    pub reverse_toggle: u8,
    pub idle_button: u8,
    pub gear_up: u8,
    pub gear_down: u8,
    /// Button for camera slot 1; slot N is `cam_base + N - 1`
    pub cam_base: u8,
    pub flaps_up: u8,
    pub flaps_down: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm_spoilers: Option<u8>,
}

impl ButtonMap {
    /// Button for a camera slot id
    pub fn camera(&self, cam_id: u8) -> u8 {
        self.cam_base.saturating_add(cam_id).saturating_sub(1)
    }
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            parking_brake: 1,
            reverse_toggle: 2,
            idle_button: 3,
            gear_up: 4,
            gear_down: 4,
            cam_base: 10,
            flaps_up: 20,
            flaps_down: 21,
            arm_spoilers: None,
        }
    }
}

/// Logical control -> axis on the cockpit device (pan/tilt on the camera head)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisMap {
    pub brakes: AxisId,
    pub spoilers: AxisId,
    pub throttle: AxisId,
    pub rudder: AxisId,
    pub yoke_x: AxisId,
    pub yoke_y: AxisId,
    pub flaps: AxisId,
    pub cam_pan: AxisId,
    pub cam_tilt: AxisId,
}

impl Default for AxisMap {
    fn default() -> Self {
        Self {
            brakes: AxisId::X,
            spoilers: AxisId::Y,
            throttle: AxisId::Z,
            rudder: AxisId::RX,
            yoke_x: AxisId::RZ,
            yoke_y: AxisId::RY,
            flaps: AxisId::Slider,
            cam_pan: AxisId::X,
            cam_tilt: AxisId::Y,
        }
    }
}

impl AxisMap {
    /// Axes the cockpit device must expose
    pub fn cockpit_axes(&self) -> Vec<AxisId> {
        let mut axes = vec![
            self.brakes,
            self.spoilers,
            self.throttle,
            self.rudder,
            self.yoke_x,
            self.yoke_y,
            self.flaps,
        ];
        axes.sort();
        axes.dedup();
        axes
    }

    /// Axes the camera-head device must expose
    pub fn camera_axes(&self) -> Vec<AxisId> {
        let mut axes = vec![self.cam_pan, self.cam_tilt];
        axes.sort();
        axes.dedup();
        axes
    }
}

/// Complete aircraft profile
///
/// Immutable once registered; shared as `Arc<Profile>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Aircraft identifier (e.g. "pmdg_777")
    pub id: String,
    pub name: String,
    pub family: AircraftFamily,
    #[serde(default)]
    pub camera_config: Vec<CameraSlot>,
    #[serde(default)]
    pub flap_detents: Vec<FlapDetent>,
    #[serde(default)]
    pub throttle_detents: Vec<ThrottleDetent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_detent_snap: Option<f64>,
    #[serde(default = "default_sensitivity")]
    pub control_sensitivity: f64,
    /// Response curve exponent (1.0 = linear)
    #[serde(default = "default_response")]
    pub control_response: f64,
    #[serde(default)]
    pub reverse_behavior: ReverseBehavior,
    /// Arm spoilers with a dedicated button instead of an axis position
    #[serde(default)]
    pub arm_spoilers_button: bool,
    /// Spoiler axis position for "armed"
    #[serde(default = "default_arm_spoiler_value")]
    pub arm_spoiler_value: f64,
    #[serde(default)]
    pub buttons: ButtonMap,
    #[serde(default)]
    pub axes: AxisMap,
}

fn default_sensitivity() -> f64 {
    1.0
}

fn default_response() -> f64 {
    1.0
}

fn default_arm_spoiler_value() -> f64 {
    0.11
}

impl Profile {
    /// Spoiler lever -> normalized spoiler axis value
    pub fn spoiler_formula(&self, value: f64) -> f64 {
        self.family.spoiler_formula(value)
    }

    /// Flap lever -> native flap axis value
    pub fn flap_axis_mapping(&self, value: f64) -> f64 {
        self.family.flap_axis_mapping(value)
    }
}
