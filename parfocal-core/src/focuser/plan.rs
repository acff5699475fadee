//! Move planning
//!
//! Turns a validated target into the steps the motor has to make. Planning
//! is pure so that the backlash rule can be tested without a motor.

use parfocal_protocol::FocusDirection;

use super::state::FocuserState;

/// Steps needed to reach a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovePlan {
    /// Logical travel direction
    pub direction: FocusDirection,
    /// Extra steps taken first to absorb gear slack (0 when not needed)
    pub backlash_steps: u32,
    /// Steps between the current position and the target
    pub steps: u32,
    /// Position once the move has completed
    pub target: u32,
}

impl MovePlan {
    /// Plan a move from `state` to `target`
    ///
    /// Returns `None` when the focuser is already at `target`. The target
    /// must already be range-checked.
    ///
    /// Backlash is taken up only on a direction reversal away from a
    /// non-zero position: at zero the mechanism is parked against its stop
    /// and there is no slack to absorb.
    pub fn new(state: &FocuserState, target: u32) -> Option<Self> {
        if target == state.position {
            return None;
        }

        let direction = if target > state.position {
            FocusDirection::Outward
        } else {
            FocusDirection::Inward
        };

        let backlash_steps = if state.backlash_steps > 0
            && direction != state.last_direction
            && state.position != 0
        {
            state.backlash_steps as u32
        } else {
            0
        };

        Some(Self {
            direction,
            backlash_steps,
            steps: target.abs_diff(state.position),
            target,
        })
    }

    /// Check if backlash compensation precedes the move
    pub fn has_backlash(&self) -> bool {
        self.backlash_steps > 0
    }
}

/// Convert a timed move into steps at the given speed
///
/// Truncates toward zero, so very short moves at high speed may be zero
/// steps.
pub fn steps_for_duration(seconds: u32, speed_rpm: u16) -> u32 {
    if speed_rpm == 0 {
        return 0;
    }
    let steps = super::state::STEPS_PER_REVOLUTION as u64 * seconds as u64 / speed_rpm as u64;
    steps.min(u32::MAX as u64) as u32
}
