// Aircraft family handlers
// Family-specific overrides consulted before the built-in rule table

use super::command::{ActuationCommand, DeviceSlot, Resolution, PULSE_HOLD};
use super::event::ControlEvent;
use super::rules;
use crate::profile::{AircraftFamily, Profile};

/// Resolve an event with the profile family's handler, if it has one
///
/// `None` means the family does not handle this event kind and the built-in
/// rule applies.
pub fn handle(event: &ControlEvent, profile: &Profile) -> Option<Resolution> {
    match profile.family {
        AircraftFamily::Boeing => None,
        AircraftFamily::Airbus => airbus(event, profile),
    }
}

fn airbus(event: &ControlEvent, profile: &Profile) -> Option<Resolution> {
    match *event {
        ControlEvent::Throttle { value, reverse } => {
            let mapped = airbus_throttle(profile, value, reverse);
            Some(rules::resolve(
                &ControlEvent::Throttle {
                    value: mapped,
                    reverse,
                },
                profile,
            ))
        }
        ControlEvent::ArmSpoilers if profile.arm_spoilers_button => {
            let button = profile.buttons.arm_spoilers?;
            Some(Resolution::new().then(ActuationCommand::pulse(
                DeviceSlot::Cockpit,
                button,
                PULSE_HOLD,
            )))
        }
        _ => None,
    }
}

/// Throttle lever -> sim throttle for the A320 quadrant
///
/// Forward thrust never drops below the idle floor. In reverse the lever
/// runs from reverse idle (lever at 0) down to full reverse (lever at 1).
pub fn airbus_throttle(profile: &Profile, value: f64, reverse: bool) -> f64 {
    let behavior = &profile.reverse_behavior;
    if reverse {
        behavior.idle_rev * (1.0 - value)
    } else {
        value.max(behavior.idle_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin;
    use virjoy_device::AxisId;

    #[test]
    fn test_boeing_has_no_handlers() {
        let profile = builtin::pmdg_777();
        assert!(handle(
            &ControlEvent::Throttle {
                value: 0.5,
                reverse: false
            },
            &profile
        )
        .is_none());
        assert!(handle(&ControlEvent::ArmSpoilers, &profile).is_none());
    }

    #[test]
    fn test_airbus_throttle_floor() {
        let profile = builtin::fenix_a320();
        let floor = profile.reverse_behavior.idle_floor;
        assert_eq!(airbus_throttle(&profile, 0.0, false), floor);
        assert_eq!(airbus_throttle(&profile, 0.8, false), 0.8);
    }

    #[test]
    fn test_airbus_throttle_reverse() {
        let profile = builtin::fenix_a320();
        let idle_rev = profile.reverse_behavior.idle_rev;
        assert_eq!(airbus_throttle(&profile, 0.0, true), idle_rev);
        assert_eq!(airbus_throttle(&profile, 1.0, true), 0.0);
    }

    #[test]
    fn test_airbus_throttle_resolution() {
        let profile = builtin::fenix_a320();
        let resolution = handle(
            &ControlEvent::Throttle {
                value: 0.5,
                reverse: false,
            },
            &profile,
        )
        .unwrap();
        let cmds: Vec<_> = resolution.commands().copied().collect();
        assert_eq!(
            cmds,
            vec![
                ActuationCommand::button(DeviceSlot::Cockpit, 2, false),
                ActuationCommand::axis(DeviceSlot::Cockpit, AxisId::Z, 16384),
            ]
        );
    }

    #[test]
    fn test_airbus_arm_spoilers_button() {
        let profile = builtin::fenix_a320();
        let resolution = handle(&ControlEvent::ArmSpoilers, &profile).unwrap();
        let cmds: Vec<_> = resolution.commands().copied().collect();
        assert_eq!(
            cmds,
            vec![ActuationCommand::pulse(DeviceSlot::Cockpit, 35, PULSE_HOLD)]
        );
    }

    #[test]
    fn test_airbus_arm_spoilers_axis_without_button() {
        let mut profile = builtin::fenix_a320();
        profile.arm_spoilers_button = false;
        assert!(handle(&ControlEvent::ArmSpoilers, &profile).is_none());
    }
}
