// Built-in control rules
// Event -> ordered actions, parameterized only by the profile's index tables

use super::command::{
    scale, to_native, Action, ActuationCommand, DeviceSlot, Resolution, PULSE_HOLD,
    SHORT_PULSE_HOLD,
};
use super::event::ControlEvent;
use super::release::ReleaseTarget;
use crate::profile::Profile;

use DeviceSlot::{CameraHead, Cockpit};

/// Resolve an event with the built-in rule table
pub fn resolve(event: &ControlEvent, profile: &Profile) -> Resolution {
    let buttons = &profile.buttons;
    let axes = &profile.axes;

    match *event {
        ControlEvent::Throttle { value, reverse } => Resolution::new()
            .then(ActuationCommand::button(Cockpit, buttons.reverse_toggle, reverse))
            .then(ActuationCommand::axis(Cockpit, axes.throttle, scale(value))),

        ControlEvent::Rudder { value } => {
            Resolution::new().then(ActuationCommand::axis(Cockpit, axes.rudder, scale(value)))
        }

        ControlEvent::Brakes { value } => Resolution::new()
            .then_action(Action::RecordWheelBrake(value))
            .then(ActuationCommand::axis(Cockpit, axes.brakes, scale(value))),

        ControlEvent::Spoilers { value } => Resolution::new().then(ActuationCommand::axis(
            Cockpit,
            axes.spoilers,
            scale(profile.spoiler_formula(value)),
        )),

        ControlEvent::ArmSpoilers => Resolution::new().then(ActuationCommand::axis(
            Cockpit,
            axes.spoilers,
            scale(profile.arm_spoiler_value),
        )),

        ControlEvent::FlapsAxis { value } => Resolution::new().then(ActuationCommand::axis(
            Cockpit,
            axes.flaps,
            to_native(profile.flap_axis_mapping(value)),
        )),

        ControlEvent::FlapCommand { value } => {
            let button = if value == 0.0 {
                buttons.flaps_up
            } else {
                buttons.flaps_down
            };
            Resolution::new().then(ActuationCommand::pulse(Cockpit, button, PULSE_HOLD))
        }

        ControlEvent::ParkingBrake { engaged: false } => {
            Resolution::new().then_action(Action::ReleaseParkingBrake(ReleaseTarget {
                button: buttons.parking_brake,
                axis: axes.brakes,
            }))
        }

        ControlEvent::ParkingBrake { engaged: true } => Resolution::new().then(
            ActuationCommand::pulse(Cockpit, buttons.parking_brake, PULSE_HOLD),
        ),

        ControlEvent::Camera { cam_id } => Resolution::new().then(ActuationCommand::pulse(
            Cockpit,
            buttons.camera(cam_id),
            SHORT_PULSE_HOLD,
        )),

        ControlEvent::FlightControls { x, y } => Resolution::new()
            .then(ActuationCommand::axis(Cockpit, axes.yoke_x, scale(x)))
            .then(ActuationCommand::axis(Cockpit, axes.yoke_y, scale(y))),

        ControlEvent::GearCommand { up } => {
            let button = if up { buttons.gear_up } else { buttons.gear_down };
            Resolution::new().then(ActuationCommand::pulse(Cockpit, button, PULSE_HOLD))
        }

        ControlEvent::IdleCommand => Resolution::new()
            .then(ActuationCommand::axis(Cockpit, axes.throttle, 0))
            .then(ActuationCommand::pulse(Cockpit, buttons.idle_button, PULSE_HOLD)),

        ControlEvent::CamControl { active: false, .. } => Resolution::ignored(),

        // Tilt is inverted: dragging up on the pad looks up
        ControlEvent::CamControl { active: true, x, y } => Resolution::new()
            .then(ActuationCommand::axis(CameraHead, axes.cam_pan, scale(x)))
            .then(ActuationCommand::axis(CameraHead, axes.cam_tilt, scale(1.0 - y))),

        ControlEvent::RawButton { button: Some(button) } => {
            Resolution::new().then(ActuationCommand::pulse(Cockpit, button, SHORT_PULSE_HOLD))
        }

        ControlEvent::RawButton { button: None } | ControlEvent::Unknown(_) => Resolution::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin;
    use virjoy_device::AxisId;

    fn commands(event: ControlEvent, profile: &Profile) -> Vec<ActuationCommand> {
        resolve(&event, profile).commands().copied().collect()
    }

    #[test]
    fn test_throttle_sets_reverse_then_axis() {
        let profile = builtin::pmdg_777();
        let cmds = commands(
            ControlEvent::Throttle {
                value: 0.5,
                reverse: true,
            },
            &profile,
        );
        assert_eq!(
            cmds,
            vec![
                ActuationCommand::button(Cockpit, 2, true),
                ActuationCommand::axis(Cockpit, AxisId::Z, 16384),
            ]
        );
    }

    #[test]
    fn test_brakes_record_wheel_brake() {
        let profile = builtin::pmdg_777();
        let resolution = resolve(&ControlEvent::Brakes { value: 0.4 }, &profile);
        assert_eq!(
            resolution.actions,
            vec![
                Action::RecordWheelBrake(0.4),
                Action::Actuate(ActuationCommand::axis(Cockpit, AxisId::X, 13107)),
            ]
        );
    }

    #[test]
    fn test_spoilers_use_family_formula() {
        let boeing = builtin::pmdg_777();
        let airbus = builtin::fenix_a320();
        let event = ControlEvent::Spoilers { value: 0.5 };

        assert_eq!(
            commands(event.clone(), &airbus),
            vec![ActuationCommand::axis(Cockpit, AxisId::Y, 16384)]
        );
        assert_eq!(
            commands(event, &boeing),
            vec![ActuationCommand::axis(Cockpit, AxisId::Y, 27197)]
        );
        assert_eq!(
            commands(ControlEvent::Spoilers { value: 0.0 }, &boeing),
            vec![ActuationCommand::axis(Cockpit, AxisId::Y, 0)]
        );
    }

    #[test]
    fn test_arm_spoilers_axis() {
        let profile = builtin::pmdg_777();
        assert_eq!(
            commands(ControlEvent::ArmSpoilers, &profile),
            vec![ActuationCommand::axis(Cockpit, AxisId::Y, 3604)]
        );
    }

    #[test]
    fn test_flaps_axis_inverted() {
        let profile = builtin::pmdg_777();
        assert_eq!(
            commands(ControlEvent::FlapsAxis { value: 0.0 }, &profile),
            vec![ActuationCommand::axis(Cockpit, AxisId::Slider, 32767)]
        );
        assert_eq!(
            commands(ControlEvent::FlapsAxis { value: 1.0 }, &profile),
            vec![ActuationCommand::axis(Cockpit, AxisId::Slider, 0)]
        );
    }

    #[test]
    fn test_flap_command_direction() {
        let profile = builtin::pmdg_777();
        assert_eq!(
            commands(ControlEvent::FlapCommand { value: 0.0 }, &profile),
            vec![ActuationCommand::pulse(Cockpit, 20, PULSE_HOLD)]
        );
        assert_eq!(
            commands(ControlEvent::FlapCommand { value: 1.0 }, &profile),
            vec![ActuationCommand::pulse(Cockpit, 21, PULSE_HOLD)]
        );
    }

    #[test]
    fn test_gear_lever_direction() {
        let mut profile = builtin::pmdg_777();
        profile.buttons.gear_up = 5;
        profile.buttons.gear_down = 6;
        assert_eq!(
            commands(ControlEvent::GearCommand { up: true }, &profile),
            vec![ActuationCommand::pulse(Cockpit, 5, PULSE_HOLD)]
        );
        assert_eq!(
            commands(ControlEvent::GearCommand { up: false }, &profile),
            vec![ActuationCommand::pulse(Cockpit, 6, PULSE_HOLD)]
        );
    }

    #[test]
    fn test_parking_brake() {
        let profile = builtin::pmdg_777();
        assert_eq!(
            commands(ControlEvent::ParkingBrake { engaged: true }, &profile),
            vec![ActuationCommand::pulse(Cockpit, 1, PULSE_HOLD)]
        );

        let resolution = resolve(&ControlEvent::ParkingBrake { engaged: false }, &profile);
        assert_eq!(
            resolution.actions,
            vec![Action::ReleaseParkingBrake(ReleaseTarget {
                button: 1,
                axis: AxisId::X
            })]
        );
    }

    #[test]
    fn test_camera_button() {
        let profile = builtin::pmdg_777();
        assert_eq!(
            commands(ControlEvent::Camera { cam_id: 3 }, &profile),
            vec![ActuationCommand::pulse(Cockpit, 12, SHORT_PULSE_HOLD)]
        );
    }

    #[test]
    fn test_idle_command_order() {
        let profile = builtin::pmdg_777();
        assert_eq!(
            commands(ControlEvent::IdleCommand, &profile),
            vec![
                ActuationCommand::axis(Cockpit, AxisId::Z, 0),
                ActuationCommand::pulse(Cockpit, 3, PULSE_HOLD),
            ]
        );
    }

    #[test]
    fn test_cam_control() {
        let profile = builtin::pmdg_777();
        let resolution = resolve(
            &ControlEvent::CamControl {
                active: false,
                x: 0.2,
                y: 0.2,
            },
            &profile,
        );
        assert_eq!(resolution, Resolution::ignored());

        assert_eq!(
            commands(
                ControlEvent::CamControl {
                    active: true,
                    x: 0.25,
                    y: 0.25
                },
                &profile
            ),
            vec![
                ActuationCommand::axis(CameraHead, AxisId::X, 8192),
                ActuationCommand::axis(CameraHead, AxisId::Y, 24575),
            ]
        );
    }

    #[test]
    fn test_raw_button_and_unknown() {
        let profile = builtin::pmdg_777();
        assert_eq!(
            commands(ControlEvent::RawButton { button: Some(7) }, &profile),
            vec![ActuationCommand::pulse(Cockpit, 7, SHORT_PULSE_HOLD)]
        );
        assert!(resolve(&ControlEvent::RawButton { button: None }, &profile)
            .actions
            .is_empty());

        let resolution = resolve(&ControlEvent::Unknown("wipers".into()), &profile);
        assert!(resolution.actions.is_empty());
        assert_eq!(resolution.outcome.as_str(), "success");
    }
}
