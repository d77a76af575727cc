// Aircraft families
// Each family fixes the lever formulas and which controls get custom handling

use serde::{Deserialize, Serialize};
use virjoy_device::AXIS_MAX;

/// Spoiler lever offset applied by Boeing-style speedbrake levers
const BOEING_SPOILER_OFFSET: f64 = 0.33;

/// Aircraft family selecting formula functions and custom control handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftFamily {
    /// PMDG 737/777: offset speedbrake curve, no custom handlers
    #[default]
    Boeing,
    /// Fenix A320: linear speedbrake, idle-floor throttle, armed-spoiler button
    Airbus,
}

impl AircraftFamily {
    /// Spoiler lever (0..1) -> spoiler axis (normalized, may exceed 1)
    pub fn spoiler_formula(self, value: f64) -> f64 {
        match self {
            AircraftFamily::Boeing => {
                if value == 0.0 {
                    0.0
                } else {
                    BOEING_SPOILER_OFFSET + value
                }
            }
            AircraftFamily::Airbus => value,
        }
    }

    /// Flap lever (0..1) -> flap axis in native device units
    ///
    /// Both families drive an inverted lever: fully retracted is full scale.
    pub fn flap_axis_mapping(self, value: f64) -> f64 {
        match self {
            AircraftFamily::Boeing | AircraftFamily::Airbus => {
                (1.0 - value) * f64::from(AXIS_MAX)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AircraftFamily::Boeing => "boeing",
            AircraftFamily::Airbus => "airbus",
        }
    }
}
