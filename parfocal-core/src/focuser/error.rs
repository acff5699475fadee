//! Focuser operation results

use crate::traits::StepperError;

/// Errors that end a focuser operation
///
/// None of these leave the controller unusable; the caller may simply issue
/// another command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FocuserError {
    /// Requested position is outside the travel limits
    OutOfRange,
    /// Motion requested before `connect` (or after `disconnect`)
    NotConnected,
    /// Preset index is not 0, 1 or 2
    InvalidPreset,
    /// The stepper driver failed
    Stepper(StepperError),
}

impl From<StepperError> for FocuserError {
    fn from(e: StepperError) -> Self {
        FocuserError::Stepper(e)
    }
}

impl FocuserError {
    /// Message reported to the host
    pub fn as_str(&self) -> &'static str {
        match self {
            FocuserError::OutOfRange => "Requested position is out of range.",
            FocuserError::NotConnected => "Focuser is not connected.",
            FocuserError::InvalidPreset => "No such preset.",
            FocuserError::Stepper(StepperError::CommunicationError) => {
                "Motor HAT is not responding."
            }
            FocuserError::Stepper(StepperError::InvalidConfig) => {
                "Motor HAT rejected the stepper configuration."
            }
        }
    }
}

/// Successful end of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveOutcome {
    /// The motor moved to the target
    Moved,
    /// The focuser was already at the target; nothing moved
    AlreadyAtPosition,
}
