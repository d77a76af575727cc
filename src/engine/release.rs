//! Timed parking-brake release
//!
//! Releasing the parking brake in the sim needs the toe brakes pressed while
//! the lever is toggled. The sequence pulses the parking-brake button, holds
//! the brake axis at full scale for [`RELEASE_HOLD`], then restores the brake
//! axis to the wheel-brake value captured when the release was requested.
//!
//! Sequences run on detached tasks. Each actuation step takes the device lock
//! only for itself, so other controls keep working during the hold. A brake
//! event that lands during the hold is overwritten by the restore step.

use super::command::{scale, ActuationCommand, DeviceSlot, PULSE_HOLD};
use super::devices::Devices;
use crate::error::ControlError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use virjoy_device::{AxisId, AXIS_MAX};

/// How long the brake axis is held at full scale
pub const RELEASE_HOLD: Duration = Duration::from_millis(1000);

/// Where the release sequence acts on the cockpit device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReleaseTarget {
    pub button: u8,
    pub axis: AxisId,
}

/// Progress of the most recent release sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseState {
    #[default]
    Idle,
    Releasing,
    Done,
}

impl ReleaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseState::Idle => "idle",
            ReleaseState::Releasing => "releasing",
            ReleaseState::Done => "done",
        }
    }
}

/// One step of a release sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStep {
    Actuate(ActuationCommand),
    Hold(Duration),
}

/// A release sequence ready to run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseSequence {
    target: ReleaseTarget,
    /// Wheel brake at trigger time (normalized)
    restore: f64,
}

impl ReleaseSequence {
    pub fn new(target: ReleaseTarget, wheel_brake: f64) -> Self {
        Self {
            target,
            restore: wheel_brake,
        }
    }

    pub fn steps(&self) -> [ReleaseStep; 4] {
        let ReleaseTarget { button, axis } = self.target;
        [
            ReleaseStep::Actuate(ActuationCommand::pulse(
                DeviceSlot::Cockpit,
                button,
                PULSE_HOLD,
            )),
            ReleaseStep::Actuate(ActuationCommand::axis(DeviceSlot::Cockpit, axis, AXIS_MAX)),
            ReleaseStep::Hold(RELEASE_HOLD),
            ReleaseStep::Actuate(ActuationCommand::axis(
                DeviceSlot::Cockpit,
                axis,
                scale(self.restore),
            )),
        ]
    }

    /// Run to completion
    ///
    /// `gate` serializes overlapping sequences; `state` is set to
    /// [`ReleaseState::Releasing`] while this sequence owns the gate and to
    /// [`ReleaseState::Done`] when it finishes (successfully or not).
    pub async fn run(
        self,
        devices: Arc<Mutex<Devices>>,
        gate: Arc<Mutex<()>>,
        state: Arc<parking_lot::Mutex<ReleaseState>>,
    ) -> Result<(), ControlError> {
        let _gate = gate.lock().await;
        set_state(&state, ReleaseState::Releasing);
        debug!("Parking brake release started (restore {:.3})", self.restore);

        let result = self.run_steps(&devices).await;

        set_state(&state, ReleaseState::Done);
        debug!("Parking brake release finished");
        result
    }

    async fn run_steps(&self, devices: &Mutex<Devices>) -> Result<(), ControlError> {
        for step in self.steps() {
            match step {
                ReleaseStep::Actuate(command) => {
                    devices.lock().await.execute(&command).await?;
                }
                ReleaseStep::Hold(duration) => tokio::time::sleep(duration).await,
            }
        }
        Ok(())
    }
}

fn set_state(state: &parking_lot::Mutex<ReleaseState>, next: ReleaseState) {
    *state.lock() = next;
}
