//! Focuser controller
//!
//! Owns the focuser state and the stepper driver. Every operation runs to
//! completion before returning; progress is reported through the status
//! sink as it happens.

use core::fmt::Write;

use parfocal_protocol::{
    FocusDirection, MotorPolarity, PropertyId, PropertyState, StepStyle, StepperChannel, Text,
};

use super::error::{FocuserError, MoveOutcome};
use super::plan::{steps_for_duration, MovePlan};
use super::state::{
    in_range, FocuserState, MAX_STEPS, MIN_POSITION, PRESET_COUNT, RESET_POSITION,
};
use crate::config::FocuserSettings;
use crate::traits::{StatusSink, StepperDriver, StepperError};

/// Focuser controller
///
/// Generic over the stepper driver and the status sink so that the same
/// logic runs against the Motor HAT on the board and against mocks in tests.
pub struct FocuserController<S, N> {
    stepper: S,
    sink: N,
    state: FocuserState,
    connected: bool,
}

impl<S: StepperDriver, N: StatusSink> FocuserController<S, N> {
    /// Create a disconnected controller with power-on defaults
    pub fn new(stepper: S, sink: N) -> Self {
        Self::with_state(stepper, sink, FocuserState::new())
    }

    /// Create a disconnected controller with a restored state
    pub fn with_state(stepper: S, sink: N, state: FocuserState) -> Self {
        Self {
            stepper,
            sink,
            state,
            connected: false,
        }
    }

    /// Get the current state
    pub fn state(&self) -> &FocuserState {
        &self.state
    }

    /// Get the current absolute position
    pub fn position(&self) -> u32 {
        self.state.position
    }

    /// Check if motion commands are accepted
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Access the stepper driver
    pub fn stepper(&self) -> &S {
        &self.stepper
    }

    /// Access the status sink
    pub fn sink(&self) -> &N {
        &self.sink
    }

    // ========================================================================
    // Connection
    // ========================================================================

    /// Bring up the driver, configure the active channel and start
    /// accepting moves
    pub fn connect(&mut self) -> Result<(), FocuserError> {
        let channel = self.state.channel;
        let speed = self.state.speed_rpm;
        let ready = self.stepper.init();
        if let Err(e) = ready.and_then(|()| self.stepper.set_speed_rpm(channel, speed)) {
            self.sink
                .set_status(PropertyId::Connection, PropertyState::Alert);
            self.sink.notify(FocuserError::Stepper(e).as_str(), None);
            return Err(FocuserError::NotConnected);
        }

        self.connected = true;
        self.sink
            .notify("Motor HAT focuser connected successfully.", None);
        Ok(())
    }

    /// Park (if enabled) and release the motor
    ///
    /// The motor is released even when parking fails; the parking error is
    /// returned after the release.
    pub fn disconnect(&mut self) -> Result<(), FocuserError> {
        let mut parked = Ok(());
        if self.connected && self.state.park_on_disconnect {
            self.sink.notify("Motor HAT focuser is parking...", None);
            parked = self.move_to(MIN_POSITION as i64).map(|_| ());
        }

        let released = self.stepper.release_all();
        self.connected = false;
        self.sink
            .notify("Motor HAT focuser disconnected successfully.", None);

        parked?;
        released?;
        Ok(())
    }

    // ========================================================================
    // Motion
    // ========================================================================

    /// Move to an absolute position
    pub fn move_absolute(&mut self, target: i32) -> Result<MoveOutcome, FocuserError> {
        self.move_to(target as i64)
    }

    /// Move by `ticks` steps in `direction`
    ///
    /// The resulting target is range-checked like an absolute move.
    pub fn move_relative(
        &mut self,
        direction: FocusDirection,
        ticks: u32,
    ) -> Result<MoveOutcome, FocuserError> {
        let offset = ticks as i64;
        let target = match direction {
            FocusDirection::Inward => self.state.position as i64 - offset,
            FocusDirection::Outward => self.state.position as i64 + offset,
        };
        self.move_to(target)
    }

    /// Move for `seconds` at the configured speed
    pub fn move_for_duration(
        &mut self,
        direction: FocusDirection,
        seconds: u32,
    ) -> Result<MoveOutcome, FocuserError> {
        let ticks = steps_for_duration(seconds, self.state.speed_rpm);
        self.move_relative(direction, ticks)
    }

    /// Re-zero after the focuser was homed by hand
    ///
    /// Only acts at position zero: the position is bumped to
    /// [`RESET_POSITION`] and the focuser driven back down to zero, which
    /// seats it against its stop. Returns `Ok(None)` when not at zero.
    pub fn reset_position(&mut self) -> Result<Option<MoveOutcome>, FocuserError> {
        self.ensure_connected()?;
        if self.state.position != MIN_POSITION {
            return Ok(None);
        }

        self.state.position = RESET_POSITION;
        self.sink.notify("Focuser position reset.", Some(RESET_POSITION));
        self.move_to(MIN_POSITION as i64).map(Some)
    }

    /// Move to a stored preset
    pub fn goto_preset(&mut self, index: usize) -> Result<MoveOutcome, FocuserError> {
        let Some(&target) = self.state.presets.get(index) else {
            self.sink
                .set_status(PropertyId::PresetGoto, PropertyState::Alert);
            self.sink.notify(FocuserError::InvalidPreset.as_str(), None);
            return Err(FocuserError::InvalidPreset);
        };
        self.move_to(target as i64)
    }

    /// Stop a move in progress
    ///
    /// Moves are blocking, so by the time this runs there is nothing left to
    /// stop; it only acknowledges the request.
    pub fn abort(&mut self) {
        self.sink.notify("Motor HAT focuser aborted.", None);
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Set the motor speed in RPM
    ///
    /// Takes effect on the driver immediately when connected.
    pub fn set_speed(&mut self, rpm: u16) -> Result<(), FocuserError> {
        self.state.speed_rpm = rpm;
        if self.connected {
            self.sink.set_status(PropertyId::MotorSpeed, PropertyState::Busy);
            self.apply_speed(PropertyId::MotorSpeed)?;
            self.sink.set_status(PropertyId::MotorSpeed, PropertyState::Ok);
        }
        self.report(None, format_args!("Motor HAT focuser speed set to {} RPM", rpm));
        Ok(())
    }

    /// Set the backlash compensation in steps
    pub fn set_backlash(&mut self, steps: u16) {
        self.state.backlash_steps = steps;
        self.report(
            None,
            format_args!("Motor HAT focuser backlash set to {} steps", steps),
        );
    }

    /// Enable or disable parking on disconnect
    pub fn set_park_on_disconnect(&mut self, enabled: bool) {
        self.state.park_on_disconnect = enabled;
        self.sink.notify(
            if enabled {
                "Parking enabled."
            } else {
                "Parking disabled."
            },
            None,
        );
    }

    /// Set which motor rotation moves the focuser outward
    pub fn set_polarity(&mut self, polarity: MotorPolarity) {
        self.state.polarity = polarity;
        self.sink.notify(
            match polarity {
                MotorPolarity::Normal => "Motor direction set to NORMAL.",
                MotorPolarity::Reversed => "Motor direction set to REVERSED.",
            },
            None,
        );
    }

    /// Select the Motor HAT port the focuser is wired to
    ///
    /// When connected, the configured speed is applied to the new channel.
    pub fn set_channel(&mut self, channel: StepperChannel) -> Result<(), FocuserError> {
        self.state.channel = channel;
        self.report(
            None,
            format_args!("Active Stepper set to {}.", channel.as_str()),
        );
        if self.connected {
            self.apply_speed(PropertyId::StepperChannel)?;
        }
        Ok(())
    }

    /// Set the coil drive pattern
    pub fn set_step_style(&mut self, style: StepStyle) {
        self.state.step_style = style;
        self.report(None, format_args!("Mode set to {}.", style.as_str()));
    }

    /// Store a preset position
    pub fn set_preset(&mut self, index: usize, position: u32) -> Result<(), FocuserError> {
        if index >= PRESET_COUNT {
            return Err(FocuserError::InvalidPreset);
        }
        if position > MAX_STEPS {
            return Err(FocuserError::OutOfRange);
        }
        self.state.presets[index] = position;
        self.report(
            None,
            format_args!("Preset {} set to {}", index + 1, position),
        );
        Ok(())
    }

    /// Snapshot the persisted part of the state
    pub fn settings(&self) -> FocuserSettings {
        FocuserSettings::from_state(&self.state)
    }

    /// Restore persisted values
    ///
    /// The position is restored only if the record carries a parked position.
    pub fn apply_settings(&mut self, settings: &FocuserSettings) {
        settings.apply_to(&mut self.state);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_connected(&mut self) -> Result<(), FocuserError> {
        if self.connected {
            return Ok(());
        }
        self.sink
            .set_status(PropertyId::AbsolutePosition, PropertyState::Alert);
        self.sink.notify(FocuserError::NotConnected.as_str(), None);
        Err(FocuserError::NotConnected)
    }

    fn move_to(&mut self, target: i64) -> Result<MoveOutcome, FocuserError> {
        self.ensure_connected()?;

        if !in_range(target) {
            self.sink.notify(FocuserError::OutOfRange.as_str(), None);
            self.sink
                .set_status(PropertyId::AbsolutePosition, PropertyState::Alert);
            return Err(FocuserError::OutOfRange);
        }

        let Some(plan) = MovePlan::new(&self.state, target as u32) else {
            self.sink.notify(
                "Motor HAT focuser already in the requested position.",
                Some(self.state.position),
            );
            self.sink
                .set_status(PropertyId::AbsolutePosition, PropertyState::Ok);
            return Ok(MoveOutcome::AlreadyAtPosition);
        };

        self.sink
            .set_status(PropertyId::AbsolutePosition, PropertyState::Busy);
        self.report(
            None,
            format_args!(
                "Motor HAT focuser is moving {} {} by {}",
                self.state.channel.as_str(),
                plan.direction.as_str(),
                plan.steps
            ),
        );

        if let Err(e) = self.execute(&plan) {
            let err = FocuserError::Stepper(e);
            self.sink.notify(err.as_str(), Some(self.state.position));
            self.sink
                .set_status(PropertyId::AbsolutePosition, PropertyState::Alert);
            return Err(err);
        }

        self.state.position = plan.target;
        self.state.last_direction = plan.direction;
        self.report(
            Some(plan.target),
            format_args!("Motor HAT focuser moved to position {}", plan.target),
        );
        self.sink
            .set_status(PropertyId::AbsolutePosition, PropertyState::Ok);
        Ok(MoveOutcome::Moved)
    }

    fn execute(&mut self, plan: &MovePlan) -> Result<(), StepperError> {
        if plan.has_backlash() {
            self.report(
                None,
                format_args!(
                    "Motor HAT focuser backlash compensation by {} steps...",
                    plan.backlash_steps
                ),
            );
            self.drive(plan.backlash_steps, plan.direction)?;
        }
        self.drive(plan.steps, plan.direction)
    }

    /// Step the motor and release it, even when stepping failed
    fn drive(&mut self, steps: u32, direction: FocusDirection) -> Result<(), StepperError> {
        let stepped = self.stepper.step(
            self.state.channel,
            steps,
            self.state.motor_direction(direction),
            self.state.step_style,
        );
        let released = self.stepper.release_all();
        stepped.and(released)
    }

    fn apply_speed(&mut self, property: PropertyId) -> Result<(), FocuserError> {
        if let Err(e) = self
            .stepper
            .set_speed_rpm(self.state.channel, self.state.speed_rpm)
        {
            let err = FocuserError::Stepper(e);
            self.sink.set_status(property, PropertyState::Alert);
            self.sink.notify(err.as_str(), None);
            return Err(err);
        }
        Ok(())
    }

    fn report(&mut self, position: Option<u32>, args: core::fmt::Arguments<'_>) {
        let mut message = Text::new();
        // Overlong messages are cut at capacity
        let _ = message.write_fmt(args);
        self.sink.notify(&message, position);
    }
}
