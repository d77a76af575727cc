//! Control mapping engine
//!
//! Turns validated [`ControlEvent`]s into device actuation for the active
//! aircraft [`Profile`]. Resolution first asks the profile family for a
//! custom handler and otherwise uses the built-in rule table; the resulting
//! actions run in order while holding the device lock.

pub mod command;
pub mod devices;
pub mod event;
pub mod handlers;
pub mod release;
pub mod rules;

pub use command::{
    scale, Action, ActuationCommand, DeviceSlot, Outcome, Resolution, PULSE_HOLD,
    SHORT_PULSE_HOLD,
};
pub use devices::Devices;
pub use event::{ControlEvent, ControlKind, ControlRequest};
pub use release::{ReleaseSequence, ReleaseState, ReleaseTarget, RELEASE_HOLD};

use crate::error::ControlError;
use crate::profile::Profile;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use virjoy_device::ActuationSink;

/// Result of a successfully applied event
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Commands executed, in order
    pub commands: Vec<ActuationCommand>,
    /// A parking-brake release sequence was started in the background
    pub release_started: bool,
    pub outcome: Outcome,
}

/// Resolve an event without touching any device
pub fn resolve(event: &ControlEvent, profile: &Profile) -> Resolution {
    handlers::handle(event, profile).unwrap_or_else(|| rules::resolve(event, profile))
}

/// Control mapping engine
///
/// Cheap to share behind an `Arc`; all mutable state sits behind locks.
pub struct ControlEngine {
    devices: Arc<Mutex<Devices>>,
    release_gate: Arc<Mutex<()>>,
    release_state: Arc<parking_lot::Mutex<ReleaseState>>,
}

impl ControlEngine {
    pub fn new(
        cockpit: Option<Box<dyn ActuationSink>>,
        camera: Option<Box<dyn ActuationSink>>,
    ) -> Self {
        Self {
            devices: Arc::new(Mutex::new(Devices::new(cockpit, camera))),
            release_gate: Arc::new(Mutex::new(())),
            release_state: Arc::new(parking_lot::Mutex::new(ReleaseState::Idle)),
        }
    }

    /// Apply one event for `profile`
    ///
    /// Device presence is checked per command, so events that resolve to no
    /// commands succeed without any device. A failing command aborts the
    /// rest of the plan; commands already executed are not rolled back.
    pub async fn apply(
        &self,
        event: &ControlEvent,
        profile: &Profile,
    ) -> Result<Applied, ControlError> {
        let resolution = resolve(event, profile);
        debug!(
            "{:?} for {}: {} action(s), {}",
            event.kind(),
            profile.id,
            resolution.actions.len(),
            resolution.outcome.as_str()
        );

        let mut applied = Applied {
            commands: Vec::with_capacity(resolution.actions.len()),
            release_started: false,
            outcome: resolution.outcome,
        };

        let mut devices = self.devices.lock().await;
        for action in resolution.actions {
            match action {
                Action::Actuate(command) => {
                    devices.execute(&command).await?;
                    applied.commands.push(command);
                }
                Action::RecordWheelBrake(value) => devices.wheel_brake = value,
                Action::ReleaseParkingBrake(target) => {
                    devices.require(DeviceSlot::Cockpit)?;
                    self.spawn_release(ReleaseSequence::new(target, devices.wheel_brake));
                    applied.release_started = true;
                }
            }
        }

        Ok(applied)
    }

    fn spawn_release(&self, sequence: ReleaseSequence) {
        let devices = Arc::clone(&self.devices);
        let gate = Arc::clone(&self.release_gate);
        let state = Arc::clone(&self.release_state);
        tokio::spawn(async move {
            if let Err(e) = sequence.run(devices, gate, state).await {
                warn!("Parking brake release failed: {}", e);
            }
        });
    }

    /// Last applied wheel-brake value
    pub async fn wheel_brake(&self) -> f64 {
        self.devices.lock().await.wheel_brake
    }

    pub fn release_state(&self) -> ReleaseState {
        *self.release_state.lock()
    }

    pub async fn has_device(&self, slot: DeviceSlot) -> bool {
        self.devices.lock().await.has(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin;
    use virjoy_device::{AxisId, MemorySink, SinkEvent};

    fn engine() -> (ControlEngine, MemorySink, MemorySink) {
        let cockpit = MemorySink::new("cockpit");
        let camera = MemorySink::new("camera");
        let engine = ControlEngine::new(
            Some(Box::new(cockpit.clone())),
            Some(Box::new(camera.clone())),
        );
        (engine, cockpit, camera)
    }

    #[tokio::test]
    async fn test_brakes_update_wheel_brake() {
        let (engine, cockpit, _) = engine();
        let profile = builtin::pmdg_777();

        let applied = engine
            .apply(&ControlEvent::Brakes { value: 0.4 }, &profile)
            .await
            .unwrap();

        assert_eq!(applied.outcome, Outcome::Success);
        assert_eq!(engine.wheel_brake().await, 0.4);
        assert_eq!(cockpit.get_axis(AxisId::X), 13107);
    }

    #[tokio::test]
    async fn test_cam_control_targets_camera_head() {
        let (engine, cockpit, camera) = engine();
        let profile = builtin::pmdg_777();

        engine
            .apply(
                &ControlEvent::CamControl {
                    active: true,
                    x: 1.0,
                    y: 1.0,
                },
                &profile,
            )
            .await
            .unwrap();

        assert!(cockpit.events().is_empty());
        assert_eq!(camera.get_axis(AxisId::X), 32767);
        assert_eq!(
            camera.events().last(),
            Some(&SinkEvent::Axis {
                axis: AxisId::Y,
                value: 0
            })
        );
    }

    #[tokio::test]
    async fn test_missing_camera_fails_but_inactive_is_ignored() {
        let cockpit = MemorySink::new("cockpit");
        let engine = ControlEngine::new(Some(Box::new(cockpit)), None);
        let profile = builtin::pmdg_777();

        let inactive = engine
            .apply(
                &ControlEvent::CamControl {
                    active: false,
                    x: 0.5,
                    y: 0.5,
                },
                &profile,
            )
            .await
            .unwrap();
        assert_eq!(inactive.outcome, Outcome::Ignored);

        let err = engine
            .apply(
                &ControlEvent::CamControl {
                    active: true,
                    x: 0.5,
                    y: 0.5,
                },
                &profile,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ControlError::DeviceUnavailable(DeviceSlot::CameraHead)
        ));
    }

    #[tokio::test]
    async fn test_unknown_event_needs_no_device() {
        let engine = ControlEngine::new(None, None);
        let applied = engine
            .apply(
                &ControlEvent::Unknown("wipers".into()),
                &builtin::pmdg_777(),
            )
            .await
            .unwrap();
        assert_eq!(applied.outcome, Outcome::Success);
        assert!(applied.commands.is_empty());
    }

    #[tokio::test]
    async fn test_release_requires_cockpit() {
        let engine = ControlEngine::new(None, None);
        let err = engine
            .apply(
                &ControlEvent::ParkingBrake { engaged: false },
                &builtin::pmdg_777(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ControlError::DeviceUnavailable(DeviceSlot::Cockpit)
        ));
        assert_eq!(engine.release_state(), ReleaseState::Idle);
    }

    #[tokio::test]
    async fn test_airbus_handler_used() {
        let (engine, cockpit, _) = engine();
        let profile = builtin::fenix_a320();

        let applied = engine
            .apply(&ControlEvent::ArmSpoilers, &profile)
            .await
            .unwrap();

        assert_eq!(
            applied.commands,
            vec![ActuationCommand::pulse(DeviceSlot::Cockpit, 35, PULSE_HOLD)]
        );
        assert_eq!(cockpit.get_axis(AxisId::Y), 0);
    }
}
