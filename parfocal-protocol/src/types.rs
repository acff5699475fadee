//! Property value types shared by host and device

use serde::{Deserialize, Serialize};

/// Logical focuser travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FocusDirection {
    /// Towards the zero reference
    Inward,
    /// Away from the zero reference
    #[default]
    Outward,
}

impl FocusDirection {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            FocusDirection::Inward => FocusDirection::Outward,
            FocusDirection::Outward => FocusDirection::Inward,
        }
    }

    /// Human-readable name used in status messages
    pub fn as_str(self) -> &'static str {
        match self {
            FocusDirection::Inward => "inward",
            FocusDirection::Outward => "outward",
        }
    }
}

/// Coil drive pattern used by the stepper driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepStyle {
    /// One coil energized per full step
    #[default]
    Single,
    /// Two coils energized per full step (more torque)
    Double,
    /// Alternating single/double half steps
    ///
    /// Switching between this or `Microstep` and a full-step style can leave
    /// the rotor on the other kind of half step; the first full step after
    /// the switch then moves half a step to realign, while the position
    /// still counts it as a whole step.
    Interleave,
    /// Sine-weighted microsteps
    Microstep,
}

impl StepStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStyle::Single => "SINGLE",
            StepStyle::Double => "DOUBLE",
            StepStyle::Interleave => "INTERLEAVE",
            StepStyle::Microstep => "MICROSTEP",
        }
    }
}

/// Which of the two Motor HAT stepper ports is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperChannel {
    /// M1/M2 terminals
    #[default]
    A,
    /// M3/M4 terminals
    B,
}

impl StepperChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            StepperChannel::A => "CHANNEL_A",
            StepperChannel::B => "CHANNEL_B",
        }
    }

    /// Zero-based port index
    pub fn index(self) -> usize {
        match self {
            StepperChannel::A => 0,
            StepperChannel::B => 1,
        }
    }
}

/// Mapping between logical outward travel and motor rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorPolarity {
    /// Outward travel is forward rotation
    #[default]
    Normal,
    /// Outward travel is backward rotation
    Reversed,
}

/// Display state of a host property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyState {
    #[default]
    Idle,
    Ok,
    Busy,
    Alert,
}

/// Host properties the focuser publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyId {
    Connection,
    AbsolutePosition,
    RelativePosition,
    MotorSpeed,
    Backlash,
    Presets,
    PresetGoto,
    PositionReset,
    Parking,
    MotorDirection,
    StepperChannel,
    StepperStyle,
    Abort,
    Config,
}
