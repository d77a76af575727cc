// Pose filter
// Sensitivity, inversion and exponential smoothing applied before encoding

use super::config::{HeadPose, HeadTrackConfig};

/// Stateful pose filter (smoothing needs the previous output)
#[derive(Debug, Clone, Default)]
pub struct PoseFilter {
    last: Option<HeadPose>,
}

impl PoseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale, invert and smooth one raw sample
    pub fn apply(&mut self, raw: &HeadPose, config: &HeadTrackConfig) -> HeadPose {
        let shaped = raw
            .zip_with(config.sensitivity, |v, s| v * s)
            .zip_with(config.invert, |v, invert| if invert { -v } else { v });

        let alpha = config.smoothing.clamp(0.0, 0.99);
        let out = match self.last {
            Some(prev) if alpha > 0.0 => {
                prev.zip_with(shaped, |p, c| p * alpha + c * (1.0 - alpha))
            }
            _ => shaped,
        };
        self.last = Some(out);
        out
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.last = None;
    }
}
