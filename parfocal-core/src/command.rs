//! Host command dispatch
//!
//! Checks each command's values against the limits the host is told about,
//! runs it on the controller and builds the [`Response`] sent back. Values
//! outside their limits are answered with an alert and never reach the
//! controller.

use parfocal_protocol::{Command, PropertyId, Response};

use crate::focuser::{
    FocuserController, FocuserError, MoveOutcome, MAX_BACKLASH_STEPS, MAX_RELATIVE_STEPS,
    MAX_SPEED_RPM, MIN_SPEED_RPM,
};
use crate::traits::{StatusSink, StepperDriver};

/// Run a host command
///
/// Persisting settings afterwards is the caller's job; see
/// [`Command::persists_config`].
pub fn dispatch<S, N>(controller: &mut FocuserController<S, N>, command: Command) -> Response
where
    S: StepperDriver,
    N: StatusSink,
{
    let property = command.property();

    match command {
        Command::Connect => finish(property, controller.connect()),
        Command::Disconnect => {
            let result = controller.disconnect();
            finish(property, result).with_position(controller.position())
        }
        Command::MoveAbsolute(target) => {
            let result = controller.move_absolute(target);
            moved(controller, property, result)
        }
        Command::MoveRelative { direction, ticks } => {
            if ticks > MAX_RELATIVE_STEPS {
                return Response::alert(property, "Relative move is out of range.")
                    .with_position(controller.position());
            }
            let result = controller.move_relative(direction, ticks);
            moved(controller, property, result)
        }
        Command::MoveTimed { direction, seconds } => {
            let result = controller.move_for_duration(direction, seconds);
            moved(controller, property, result)
        }
        Command::SetSpeed(rpm) => {
            if !(MIN_SPEED_RPM..=MAX_SPEED_RPM).contains(&rpm) {
                return Response::alert(property, "Speed is out of range.");
            }
            finish(property, controller.set_speed(rpm))
        }
        Command::SetBacklash(steps) => {
            if steps > MAX_BACKLASH_STEPS {
                return Response::alert(property, "Backlash is out of range.");
            }
            controller.set_backlash(steps);
            Response::ok(property)
        }
        Command::SetPreset { index, position } => {
            let Ok(position) = u32::try_from(position) else {
                return Response::alert(property, FocuserError::OutOfRange.as_str());
            };
            finish(property, controller.set_preset(index as usize, position))
        }
        Command::GotoPreset(index) => {
            let result = controller.goto_preset(index as usize);
            moved(controller, property, result)
        }
        Command::ResetPosition => {
            let response = match controller.reset_position() {
                Ok(_) => Response::ok(property),
                Err(e) => Response::alert(property, e.as_str()),
            };
            response.with_position(controller.position())
        }
        Command::SetParking(enabled) => {
            controller.set_park_on_disconnect(enabled);
            Response::ok(property)
        }
        Command::SetPolarity(polarity) => {
            controller.set_polarity(polarity);
            Response::ok(property)
        }
        Command::SetChannel(channel) => finish(property, controller.set_channel(channel)),
        Command::SetStepStyle(style) => {
            controller.set_step_style(style);
            Response::ok(property)
        }
        Command::Abort => {
            controller.abort();
            Response::ok(property)
        }
        // Writing flash is up to the caller
        Command::SaveConfig => Response::ok(property),
        Command::QueryStatus => Response::ok(property).with_position(controller.position()),
    }
}

fn finish(property: PropertyId, result: Result<(), FocuserError>) -> Response {
    match result {
        Ok(()) => Response::ok(property),
        Err(e) => Response::alert(property, e.as_str()),
    }
}

fn moved<S, N>(
    controller: &FocuserController<S, N>,
    property: PropertyId,
    result: Result<MoveOutcome, FocuserError>,
) -> Response
where
    S: StepperDriver,
    N: StatusSink,
{
    let response = match result {
        Ok(MoveOutcome::Moved) => Response::ok(property),
        Ok(MoveOutcome::AlreadyAtPosition) => {
            Response::ok(property).with_message("Already at the requested position.")
        }
        Err(e) => Response::alert(property, e.as_str()),
    };
    response.with_position(controller.position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Direction, StepperError};
    use parfocal_protocol::{
        FocusDirection, MotorPolarity, PropertyState, StepStyle, StepperChannel,
    };

    #[derive(Default)]
    struct CountingStepper {
        steps: u32,
        last_speed: Option<(StepperChannel, u16)>,
    }

    impl StepperDriver for CountingStepper {
        fn init(&mut self) -> Result<(), StepperError> {
            Ok(())
        }

        fn set_speed_rpm(
            &mut self,
            channel: StepperChannel,
            rpm: u16,
        ) -> Result<(), StepperError> {
            self.last_speed = Some((channel, rpm));
            Ok(())
        }

        fn step(
            &mut self,
            _channel: StepperChannel,
            count: u32,
            _direction: Direction,
            _style: StepStyle,
        ) -> Result<(), StepperError> {
            self.steps += count;
            Ok(())
        }

        fn release_all(&mut self) -> Result<(), StepperError> {
            Ok(())
        }
    }

    struct NullSink;

    impl StatusSink for NullSink {
        fn notify(&mut self, _message: &str, _position: Option<u32>) {}
        fn set_status(&mut self, _property: PropertyId, _state: PropertyState) {}
    }

    fn connected() -> FocuserController<CountingStepper, NullSink> {
        let mut focuser = FocuserController::new(CountingStepper::default(), NullSink);
        assert!(dispatch(&mut focuser, Command::Connect).is_ok());
        focuser
    }

    #[test]
    fn test_move_absolute_response() {
        let mut focuser = connected();
        let resp = dispatch(&mut focuser, Command::MoveAbsolute(2500));
        assert!(resp.is_ok());
        assert_eq!(resp.property, PropertyId::AbsolutePosition);
        assert_eq!(resp.position, Some(2500));
    }

    #[test]
    fn test_move_out_of_range_alerts() {
        let mut focuser = connected();
        let resp = dispatch(&mut focuser, Command::MoveAbsolute(25_000));
        assert_eq!(resp.state, PropertyState::Alert);
        assert_eq!(resp.position, Some(0));
        assert!(resp.message.is_some());
    }

    #[test]
    fn test_move_before_connect_alerts() {
        let mut focuser = FocuserController::new(CountingStepper::default(), NullSink);
        let resp = dispatch(&mut focuser, Command::MoveAbsolute(10));
        assert_eq!(resp.state, PropertyState::Alert);
        assert_eq!(focuser.stepper().steps, 0);
    }

    #[test]
    fn test_already_at_position_is_ok() {
        let mut focuser = connected();
        let resp = dispatch(&mut focuser, Command::MoveAbsolute(0));
        assert!(resp.is_ok());
        assert!(resp.message.is_some());
    }

    #[test]
    fn test_relative_limit() {
        let mut focuser = connected();
        let resp = dispatch(
            &mut focuser,
            Command::MoveRelative {
                direction: FocusDirection::Outward,
                ticks: MAX_RELATIVE_STEPS + 1,
            },
        );
        assert_eq!(resp.state, PropertyState::Alert);
        assert_eq!(focuser.position(), 0);

        let resp = dispatch(
            &mut focuser,
            Command::MoveRelative {
                direction: FocusDirection::Outward,
                ticks: MAX_RELATIVE_STEPS,
            },
        );
        assert!(resp.is_ok());
        assert_eq!(resp.property, PropertyId::RelativePosition);
        assert_eq!(focuser.position(), MAX_RELATIVE_STEPS);
    }

    #[test]
    fn test_speed_limits() {
        let mut focuser = connected();
        assert!(!dispatch(&mut focuser, Command::SetSpeed(9)).is_ok());
        assert!(!dispatch(&mut focuser, Command::SetSpeed(251)).is_ok());
        assert_eq!(focuser.state().speed_rpm, 30);

        assert!(dispatch(&mut focuser, Command::SetSpeed(250)).is_ok());
        assert_eq!(
            focuser.stepper().last_speed,
            Some((StepperChannel::A, 250))
        );
    }

    #[test]
    fn test_backlash_limits() {
        let mut focuser = connected();
        assert!(!dispatch(&mut focuser, Command::SetBacklash(501)).is_ok());
        assert!(dispatch(&mut focuser, Command::SetBacklash(500)).is_ok());
        assert_eq!(focuser.state().backlash_steps, 500);
    }

    #[test]
    fn test_preset_commands() {
        let mut focuser = connected();
        let set = Command::SetPreset {
            index: 2,
            position: 12_000,
        };
        assert!(dispatch(&mut focuser, set).is_ok());

        let resp = dispatch(&mut focuser, Command::GotoPreset(2));
        assert!(resp.is_ok());
        assert_eq!(resp.position, Some(12_000));

        let negative = Command::SetPreset {
            index: 0,
            position: -5,
        };
        assert!(!dispatch(&mut focuser, negative).is_ok());
        assert!(!dispatch(&mut focuser, Command::GotoPreset(7)).is_ok());
    }

    #[test]
    fn test_timed_move() {
        let mut focuser = connected();
        dispatch(&mut focuser, Command::SetSpeed(20));
        let resp = dispatch(
            &mut focuser,
            Command::MoveTimed {
                direction: FocusDirection::Outward,
                seconds: 10,
            },
        );
        assert!(resp.is_ok());
        assert_eq!(resp.position, Some(200));
    }

    #[test]
    fn test_reset_position() {
        let mut focuser = connected();
        let resp = dispatch(&mut focuser, Command::ResetPosition);
        assert!(resp.is_ok());
        assert_eq!(resp.position, Some(0));
        assert_eq!(focuser.stepper().steps, 200);
    }

    #[test]
    fn test_switch_settings() {
        let mut focuser = connected();
        assert!(dispatch(&mut focuser, Command::SetParking(false)).is_ok());
        assert!(dispatch(&mut focuser, Command::SetPolarity(MotorPolarity::Reversed)).is_ok());
        assert!(dispatch(&mut focuser, Command::SetStepStyle(StepStyle::Double)).is_ok());
        assert!(dispatch(&mut focuser, Command::SetChannel(StepperChannel::B)).is_ok());

        let state = focuser.state();
        assert!(!state.park_on_disconnect);
        assert_eq!(state.polarity, MotorPolarity::Reversed);
        assert_eq!(state.step_style, StepStyle::Double);
        assert_eq!(state.channel, StepperChannel::B);
    }

    #[test]
    fn test_disconnect_parks_and_reports_position() {
        let mut focuser = connected();
        dispatch(&mut focuser, Command::MoveAbsolute(900));
        let resp = dispatch(&mut focuser, Command::Disconnect);
        assert!(resp.is_ok());
        assert_eq!(resp.position, Some(0));
        assert!(!focuser.is_connected());
    }

    #[test]
    fn test_query_status() {
        let mut focuser = connected();
        dispatch(&mut focuser, Command::MoveAbsolute(321));
        let resp = dispatch(&mut focuser, Command::QueryStatus);
        assert!(resp.is_ok());
        assert_eq!(resp.position, Some(321));
        assert_eq!(focuser.stepper().steps, 321);
    }
}
