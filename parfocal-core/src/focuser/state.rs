//! Focuser state record and travel limits

use parfocal_protocol::{FocusDirection, MotorPolarity, StepStyle, StepperChannel};

use crate::traits::Direction;

/// Upper travel limit in steps
pub const MAX_STEPS: u32 = 20_000;

/// Lower travel limit in steps (the park position)
pub const MIN_POSITION: u32 = 0;

/// Steps per revolution used to convert timed moves into steps
pub const STEPS_PER_REVOLUTION: u32 = 400;

/// Position assumed after a manual re-zero, before homing back to zero
pub const RESET_POSITION: u32 = MAX_STEPS / 100;

/// Largest relative move accepted from the host
pub const MAX_RELATIVE_STEPS: u32 = MAX_STEPS / 10;

/// Motor speed limits in RPM
pub const MIN_SPEED_RPM: u16 = 10;
pub const MAX_SPEED_RPM: u16 = 250;
pub const DEFAULT_SPEED_RPM: u16 = 30;

/// Largest backlash compensation in steps
pub const MAX_BACKLASH_STEPS: u16 = 500;

/// Number of stored preset positions
pub const PRESET_COUNT: usize = 3;

/// Everything the controller knows about the focuser
///
/// `position` is always within `MIN_POSITION..=MAX_STEPS`; only the
/// controller mutates it and only after a move has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FocuserState {
    /// Absolute step count from the zero reference
    pub position: u32,
    /// Direction of the last completed move
    pub last_direction: FocusDirection,
    pub step_style: StepStyle,
    pub speed_rpm: u16,
    pub backlash_steps: u16,
    pub channel: StepperChannel,
    pub polarity: MotorPolarity,
    /// Move to `MIN_POSITION` before releasing on disconnect
    pub park_on_disconnect: bool,
    pub presets: [u32; PRESET_COUNT],
}

impl Default for FocuserState {
    fn default() -> Self {
        Self::new()
    }
}

impl FocuserState {
    /// Power-on state
    pub const fn new() -> Self {
        Self {
            position: MIN_POSITION,
            last_direction: FocusDirection::Outward,
            step_style: StepStyle::Single,
            speed_rpm: DEFAULT_SPEED_RPM,
            backlash_steps: 0,
            channel: StepperChannel::A,
            polarity: MotorPolarity::Normal,
            park_on_disconnect: true,
            presets: [0; PRESET_COUNT],
        }
    }

    /// Motor rotation for a logical travel direction under the current polarity
    pub fn motor_direction(&self, direction: FocusDirection) -> Direction {
        motor_direction(direction, self.polarity)
    }
}

/// Map logical travel to motor rotation
pub fn motor_direction(direction: FocusDirection, polarity: MotorPolarity) -> Direction {
    match (direction, polarity) {
        (FocusDirection::Outward, MotorPolarity::Normal) => Direction::Forward,
        (FocusDirection::Outward, MotorPolarity::Reversed) => Direction::Backward,
        (FocusDirection::Inward, MotorPolarity::Normal) => Direction::Backward,
        (FocusDirection::Inward, MotorPolarity::Reversed) => Direction::Forward,
    }
}

/// Check if a position is within the travel limits
pub fn in_range(position: i64) -> bool {
    position >= MIN_POSITION as i64 && position <= MAX_STEPS as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_state() {
        let state = FocuserState::default();
        assert_eq!(state.position, 0);
        assert_eq!(state.last_direction, FocusDirection::Outward);
        assert_eq!(state.speed_rpm, 30);
        assert_eq!(state.backlash_steps, 0);
        assert!(state.park_on_disconnect);
        assert_eq!(state.presets, [0, 0, 0]);
    }

    #[test]
    fn test_motor_direction_table() {
        use FocusDirection::*;
        use MotorPolarity::*;
        assert_eq!(motor_direction(Outward, Normal), Direction::Forward);
        assert_eq!(motor_direction(Outward, Reversed), Direction::Backward);
        assert_eq!(motor_direction(Inward, Normal), Direction::Backward);
        assert_eq!(motor_direction(Inward, Reversed), Direction::Forward);
    }

    #[test]
    fn test_reversed_polarity_flips_both_directions() {
        for dir in [FocusDirection::Inward, FocusDirection::Outward] {
            assert_eq!(
                motor_direction(dir, MotorPolarity::Reversed),
                motor_direction(dir, MotorPolarity::Normal).opposite()
            );
        }
    }

    #[test]
    fn test_range_limits() {
        assert!(in_range(0));
        assert!(in_range(MAX_STEPS as i64));
        assert!(!in_range(-1));
        assert!(!in_range(MAX_STEPS as i64 + 1));
    }
}
