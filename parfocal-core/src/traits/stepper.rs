//! Stepper motor driver trait
//!
//! This trait abstracts over the board that energizes the focuser motor
//! coils (the Motor HAT today). Moves are blocking: `step` returns once
//! the last step has been issued.

use parfocal_protocol::{StepStyle, StepperChannel};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Forward coil sequence
    Forward,
    /// Reverse coil sequence
    Backward,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Errors that can occur with stepper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// Communication error with the driver board (I2C)
    CommunicationError,
    /// Invalid configuration (e.g. zero speed)
    InvalidConfig,
}

/// Trait for stepper motor drivers
///
/// A driver owns every channel on its board. Channels keep their own speed
/// and coil phase; `release_all` de-energizes all of them at once.
pub trait StepperDriver {
    /// Bring the driver board up with every coil released
    ///
    /// Run on each connect; an error means the board cannot be driven.
    fn init(&mut self) -> Result<(), StepperError>;

    /// Set the speed in RPM used for subsequent steps on `channel`
    fn set_speed_rpm(&mut self, channel: StepperChannel, rpm: u16) -> Result<(), StepperError>;

    /// Issue `count` steps on `channel`
    ///
    /// Each step is one coil pattern change, except for microstep where a
    /// step is subdivided into the driver's microsteps.
    fn step(
        &mut self,
        channel: StepperChannel,
        count: u32,
        direction: Direction,
        style: StepStyle,
    ) -> Result<(), StepperError>;

    /// De-energize all coils on every channel
    fn release_all(&mut self) -> Result<(), StepperError>;
}
