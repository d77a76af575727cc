// Builtin aircraft profiles
// Hardcoded profiles for the supported aircraft (no external JSON needed)

use super::family::AircraftFamily;
use super::types::{
    AxisMap, ButtonMap, CameraSlot, FlapDetent, Profile, ReverseBehavior, ThrottleDetent,
};

/// Profile used when a request names no aircraft or an unknown one
pub const DEFAULT_PROFILE_ID: &str = "pmdg_777";

/// Camera views shared by the airliner cockpits
const AIRLINER_CAMERAS: &[&str] = &[
    "Captain",
    "Left Engine",
    "Left Wing",
    "Right Engine",
    "Right Wing",
    "EFB",
    "FMC",
    "Overhead",
];

fn cameras(extra: &[&str]) -> Vec<CameraSlot> {
    AIRLINER_CAMERAS
        .iter()
        .chain(extra)
        .enumerate()
        .map(|(i, name)| CameraSlot {
            id: i as u8 + 1,
            name: (*name).to_string(),
        })
        .collect()
}

fn flap_detents(detents: &[(&str, f64)]) -> Vec<FlapDetent> {
    detents
        .iter()
        .enumerate()
        .map(|(i, &(label, value))| FlapDetent {
            index: i as u8,
            label: label.to_string(),
            value,
        })
        .collect()
}

/// PMDG 777
pub fn pmdg_777() -> Profile {
    Profile {
        id: "pmdg_777".to_string(),
        name: "PMDG 777".to_string(),
        family: AircraftFamily::Boeing,
        camera_config: cameras(&["MCP"]),
        flap_detents: flap_detents(&[
            ("UP", 0.0),
            ("1", 0.16),
            ("5", 0.33),
            ("15", 0.50),
            ("20", 0.66),
            ("25", 0.83),
            ("30", 1.0),
        ]),
        throttle_detents: Vec::new(),
        throttle_detent_snap: None,
        control_sensitivity: 1.0,
        control_response: 1.0,
        reverse_behavior: ReverseBehavior::default(),
        arm_spoilers_button: false,
        arm_spoiler_value: 0.11,
        buttons: ButtonMap::default(),
        axes: AxisMap::default(),
    }
}

/// PMDG 737
pub fn pmdg_737() -> Profile {
    Profile {
        id: "pmdg_737".to_string(),
        name: "PMDG 737".to_string(),
        flap_detents: flap_detents(&[
            ("UP", 0.0),
            ("1", 0.125),
            ("2", 0.25),
            ("5", 0.375),
            ("10", 0.5),
            ("15", 0.625),
            ("25", 0.75),
            ("30", 0.875),
            ("40", 1.0),
        ]),
        camera_config: cameras(&["MCP"]),
        ..pmdg_777()
    }
}

/// Fenix A320
pub fn fenix_a320() -> Profile {
    Profile {
        id: "fenix_a320".to_string(),
        name: "Fenix A320".to_string(),
        family: AircraftFamily::Airbus,
        camera_config: cameras(&[]),
        flap_detents: flap_detents(&[
            ("0", 0.0),
            ("1", 0.25),
            ("2", 0.5),
            ("3", 0.75),
            ("FULL", 1.0),
        ]),
        throttle_detents: vec![
            ThrottleDetent {
                label: "CLB".to_string(),
                value: 0.70,
            },
            ThrottleDetent {
                label: "FLX/MCT".to_string(),
                value: 0.85,
            },
            ThrottleDetent {
                label: "TO/GA".to_string(),
                value: 1.0,
            },
        ],
        throttle_detent_snap: Some(0.05),
        control_sensitivity: 1.0,
        control_response: 1.6,
        reverse_behavior: ReverseBehavior {
            spool_down_ms: 0,
            idle_floor: 0.007,
            idle_rev: 0.0065,
            idle_bump_up: 0.05,
            idle_bump_ms: 150,
            idle_bump_down: 0.0005,
        },
        arm_spoilers_button: true,
        arm_spoiler_value: 0.11,
        buttons: ButtonMap {
            arm_spoilers: Some(35),
            ..ButtonMap::default()
        },
        axes: AxisMap::default(),
    }
}

/// All builtin profiles
pub fn all() -> Vec<Profile> {
    vec![pmdg_777(), pmdg_737(), fenix_a320()]
}
