//! Message types for the host link
//!
//! Message types are divided into two categories:
//! - Host → Device: [`Command`]s, one per property update
//! - Device → Host: [`DeviceMessage`]s, a [`Response`] per command plus
//!   notifications emitted while the command runs

use serde::{Deserialize, Serialize};

use crate::events::{text, Notification, Text};
use crate::types::{
    FocusDirection, MotorPolarity, PropertyId, PropertyState, StepStyle, StepperChannel,
};

/// Commands sent by the host
///
/// Numeric payloads are carried as the host sent them; range checks happen
/// on the device so that a bad value can be answered with an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Energize the stepper and start accepting moves
    Connect,
    /// Park (if enabled) and release the stepper
    Disconnect,
    /// Move to an absolute step position
    MoveAbsolute(i32),
    /// Move by a number of steps in a direction
    MoveRelative {
        direction: FocusDirection,
        ticks: u32,
    },
    /// Move for a number of seconds at the configured speed
    MoveTimed {
        direction: FocusDirection,
        seconds: u32,
    },
    /// Motor speed in RPM
    SetSpeed(u16),
    /// Backlash compensation in steps
    SetBacklash(u16),
    /// Store a preset position (index 0-2)
    SetPreset { index: u8, position: i32 },
    /// Move to a stored preset (index 0-2)
    GotoPreset(u8),
    /// Re-zero after a manual homing
    ResetPosition,
    /// Enable or disable parking on disconnect
    SetParking(bool),
    SetPolarity(MotorPolarity),
    SetChannel(StepperChannel),
    SetStepStyle(StepStyle),
    Abort,
    /// Write the current settings to persistent storage
    SaveConfig,
    /// Report the current position without moving
    QueryStatus,
}

impl Command {
    /// The host property this command updates
    pub fn property(&self) -> PropertyId {
        match self {
            Command::Connect | Command::Disconnect => PropertyId::Connection,
            Command::MoveAbsolute(_) | Command::QueryStatus => PropertyId::AbsolutePosition,
            Command::MoveRelative { .. } | Command::MoveTimed { .. } => {
                PropertyId::RelativePosition
            }
            Command::SetSpeed(_) => PropertyId::MotorSpeed,
            Command::SetBacklash(_) => PropertyId::Backlash,
            Command::SetPreset { .. } => PropertyId::Presets,
            Command::GotoPreset(_) => PropertyId::PresetGoto,
            Command::ResetPosition => PropertyId::PositionReset,
            Command::SetParking(_) => PropertyId::Parking,
            Command::SetPolarity(_) => PropertyId::MotorDirection,
            Command::SetChannel(_) => PropertyId::StepperChannel,
            Command::SetStepStyle(_) => PropertyId::StepperStyle,
            Command::Abort => PropertyId::Abort,
            Command::SaveConfig => PropertyId::Config,
        }
    }

    /// Check if the settings record must be written after this command
    ///
    /// Settings are saved on disconnect (which may also have parked the
    /// focuser), on explicit request, and whenever a persisted value changes.
    pub fn persists_config(&self) -> bool {
        matches!(
            self,
            Command::Disconnect
                | Command::SaveConfig
                | Command::SetSpeed(_)
                | Command::SetBacklash(_)
                | Command::SetPreset { .. }
                | Command::SetParking(_)
                | Command::SetPolarity(_)
                | Command::SetChannel(_)
                | Command::SetStepStyle(_)
        )
    }
}

/// Answer to a single [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    /// Property the command updated
    pub property: PropertyId,
    /// Final property state
    pub state: PropertyState,
    /// Absolute position after the command, for position properties
    pub position: Option<u32>,
    /// Optional human-readable explanation
    pub message: Option<Text>,
}

impl Response {
    /// Successful response with no payload
    pub fn ok(property: PropertyId) -> Self {
        Self {
            property,
            state: PropertyState::Ok,
            position: None,
            message: None,
        }
    }

    /// Alert response with an explanation
    pub fn alert(property: PropertyId, message: &str) -> Self {
        Self {
            property,
            state: PropertyState::Alert,
            position: None,
            message: Some(text(message)),
        }
    }

    /// Attach the current position
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Attach a message
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(text(message));
        self
    }

    /// Check if the command succeeded
    pub fn is_ok(&self) -> bool {
        self.state == PropertyState::Ok
    }
}

/// Everything the device sends to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMessage {
    Response(Response),
    Notification(Notification),
}

impl From<Response> for DeviceMessage {
    fn from(response: Response) -> Self {
        DeviceMessage::Response(response)
    }
}

impl From<Notification> for DeviceMessage {
    fn from(notification: Notification) -> Self {
        DeviceMessage::Notification(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisting_commands() {
        assert!(Command::Disconnect.persists_config());
        assert!(Command::SaveConfig.persists_config());
        assert!(Command::SetBacklash(20).persists_config());
        assert!(Command::SetChannel(StepperChannel::B).persists_config());
        assert!(!Command::Connect.persists_config());
        assert!(!Command::MoveAbsolute(10).persists_config());
        assert!(!Command::QueryStatus.persists_config());
    }

    #[test]
    fn test_command_property() {
        assert_eq!(
            Command::MoveAbsolute(5).property(),
            PropertyId::AbsolutePosition
        );
        assert_eq!(
            Command::MoveTimed {
                direction: FocusDirection::Outward,
                seconds: 3
            }
            .property(),
            PropertyId::RelativePosition
        );
        assert_eq!(Command::GotoPreset(2).property(), PropertyId::PresetGoto);
        assert_eq!(Command::SetParking(false).property(), PropertyId::Parking);
    }

    #[test]
    fn test_response_builders() {
        let resp = Response::ok(PropertyId::AbsolutePosition).with_position(4200);
        assert!(resp.is_ok());
        assert_eq!(resp.position, Some(4200));
        assert!(resp.message.is_none());

        let alert = Response::alert(PropertyId::MotorSpeed, "speed out of range");
        assert!(!alert.is_ok());
        assert_eq!(alert.state, PropertyState::Alert);
        assert_eq!(alert.message.as_deref(), Some("speed out of range"));
    }
}
