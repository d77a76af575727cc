// Head-track configuration
// Target address, per-axis tuning and wire layout; partial updates merge

use super::HeadTrackError;
use serde::{Deserialize, Deserializer, Serialize};

/// Default UDP port of the tracking consumer
pub const DEFAULT_PORT: u16 = 4242;

/// Packet layout sent to the tracking consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireLayout {
    /// 48 bytes: six f64 (x, y, z, yaw, pitch, roll)
    #[default]
    Primary,
    /// 32 bytes: magic plus six i32 in hundredths
    Legacy,
}

/// One value per tracked axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerAxis<T> {
    pub pitch: T,
    pub roll: T,
    pub yaw: T,
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Copy> PerAxis<T> {
    pub fn splat(value: T) -> Self {
        Self {
            pitch: value,
            roll: value,
            yaw: value,
            x: value,
            y: value,
            z: value,
        }
    }

    /// Combine two sets axis by axis
    pub fn zip_with<U: Copy, R>(self, other: PerAxis<U>, f: impl Fn(T, U) -> R) -> PerAxis<R> {
        PerAxis {
            pitch: f(self.pitch, other.pitch),
            roll: f(self.roll, other.roll),
            yaw: f(self.yaw, other.yaw),
            x: f(self.x, other.x),
            y: f(self.y, other.y),
            z: f(self.z, other.z),
        }
    }

    pub fn values(&self) -> [T; 6] {
        [self.pitch, self.roll, self.yaw, self.x, self.y, self.z]
    }
}

/// A head pose sample: degrees for rotations, centimeters for translation
pub type HeadPose = PerAxis<f64>;

/// Pose as posted by the client; missing axes are 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PoseSample {
    #[serde(deserialize_with = "lenient::number")]
    pub pitch: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub roll: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub yaw: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub x: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub y: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub z: Option<f64>,
}

impl PoseSample {
    pub fn into_pose(self) -> Result<HeadPose, HeadTrackError> {
        let pose = HeadPose {
            pitch: self.pitch.unwrap_or(0.0),
            roll: self.roll.unwrap_or(0.0),
            yaw: self.yaw.unwrap_or(0.0),
            x: self.x.unwrap_or(0.0),
            y: self.y.unwrap_or(0.0),
            z: self.z.unwrap_or(0.0),
        };
        if pose.values().iter().all(|v| v.is_finite()) {
            Ok(pose)
        } else {
            Err(HeadTrackError::InvalidSample)
        }
    }
}

/// Partial per-axis update; absent axes keep their value
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct AxisPatch<T> {
    pub pitch: Option<T>,
    pub roll: Option<T>,
    pub yaw: Option<T>,
    pub x: Option<T>,
    pub y: Option<T>,
    pub z: Option<T>,
}

impl<T: Copy> AxisPatch<T> {
    fn apply(&self, target: &mut PerAxis<T>) {
        let slots = [
            (self.pitch, &mut target.pitch),
            (self.roll, &mut target.roll),
            (self.yaw, &mut target.yaw),
            (self.x, &mut target.x),
            (self.y, &mut target.y),
            (self.z, &mut target.z),
        ];
        for (value, slot) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    fn values(&self) -> impl Iterator<Item = T> {
        [self.pitch, self.roll, self.yaw, self.x, self.y, self.z]
            .into_iter()
            .flatten()
    }
}

/// Head-track settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadTrackConfig {
    pub host: String,
    pub port: u16,
    pub sensitivity: PerAxis<f64>,
    /// Exponential smoothing factor: 0 = off, towards 1 = heavier
    pub smoothing: f64,
    pub invert: PerAxis<bool>,
    pub layout: WireLayout,
}

impl Default for HeadTrackConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            sensitivity: PerAxis::splat(1.0),
            smoothing: 0.0,
            invert: PerAxis::splat(false),
            layout: WireLayout::Primary,
        }
    }
}

/// Partial configuration update
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct HeadTrackPatch {
    pub host: Option<String>,
    #[serde(deserialize_with = "lenient::port")]
    pub port: Option<u16>,
    pub sensitivity: Option<AxisPatch<f64>>,
    #[serde(deserialize_with = "lenient::number")]
    pub smoothing: Option<f64>,
    pub invert: Option<AxisPatch<bool>>,
    pub layout: Option<WireLayout>,
}

impl HeadTrackConfig {
    /// Merge a partial update
    ///
    /// The whole patch is validated first; on error nothing changes.
    pub fn merge(&mut self, patch: &HeadTrackPatch) -> Result<(), HeadTrackError> {
        if let Some(host) = &patch.host {
            if host.trim().is_empty() {
                return Err(HeadTrackError::InvalidConfig("host is empty".to_string()));
            }
        }
        if patch.port == Some(0) {
            return Err(HeadTrackError::InvalidConfig("port must be non-zero".to_string()));
        }
        if let Some(smoothing) = patch.smoothing {
            if !(0.0..1.0).contains(&smoothing) {
                return Err(HeadTrackError::InvalidConfig(format!(
                    "smoothing {smoothing} outside 0..1"
                )));
            }
        }
        if let Some(sensitivity) = &patch.sensitivity {
            if sensitivity.values().any(|s| !s.is_finite()) {
                return Err(HeadTrackError::InvalidConfig(
                    "sensitivity must be finite".to_string(),
                ));
            }
        }

        if let Some(host) = &patch.host {
            self.host = host.trim().to_string();
        }
        if let Some(port) = patch.port {
            self.port = port;
        }
        if let Some(sensitivity) = &patch.sensitivity {
            sensitivity.apply(&mut self.sensitivity);
        }
        if let Some(smoothing) = patch.smoothing {
            self.smoothing = smoothing;
        }
        if let Some(invert) = &patch.invert {
            invert.apply(&mut self.invert);
        }
        if let Some(layout) = patch.layout {
            self.layout = layout;
        }
        Ok(())
    }

    /// Host to send to, with `localhost` pinned to IPv4 loopback
    pub fn resolved_host(&self) -> &str {
        if self.host.eq_ignore_ascii_case("localhost") {
            "127.0.0.1"
        } else {
            &self.host
        }
    }
}

/// Numbers that may arrive as JSON strings
mod lenient {
    use super::*;
    use serde::de::Error;
    use serde_json::Value;

    pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
        match Option::<Value>::deserialize(de)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| D::Error::custom("invalid number")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid number {s:?}"))),
            Some(other) => Err(D::Error::custom(format!("expected number, got {other}"))),
        }
    }

    pub fn port<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u16>, D::Error> {
        match number(de)? {
            None => Ok(None),
            Some(p) if p.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&p) => {
                Ok(Some(p as u16))
            }
            Some(p) => Err(D::Error::custom(format!("invalid port {p}"))),
        }
    }
}
