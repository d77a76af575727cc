//! Axis identifiers and the native device value range

use serde::{Deserialize, Serialize};

/// Lowest native axis value
pub const AXIS_MIN: i32 = 0;
/// Highest native axis value (full deflection)
pub const AXIS_MAX: i32 = 32767;

/// Number of buttons exposed by each virtual device (numbered from 1)
pub const MAX_BUTTONS: u8 = 40;

/// Joystick axis identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxisId {
    X,
    Y,
    Z,
    RX,
    RY,
    RZ,
    /// First slider (reported as the throttle usage)
    #[serde(alias = "SL0")]
    Slider,
}

impl AxisId {
    /// Get display name for the axis
    pub fn display_name(&self) -> &'static str {
        match self {
            AxisId::X => "X",
            AxisId::Y => "Y",
            AxisId::Z => "Z",
            AxisId::RX => "RX",
            AxisId::RY => "RY",
            AxisId::RZ => "RZ",
            AxisId::Slider => "SL0",
        }
    }

    /// All available axis IDs
    pub const ALL: &'static [AxisId] = &[
        AxisId::X,
        AxisId::Y,
        AxisId::Z,
        AxisId::RX,
        AxisId::RY,
        AxisId::RZ,
        AxisId::Slider,
    ];
}

impl std::fmt::Display for AxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
