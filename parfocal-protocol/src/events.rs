//! Unsolicited notifications from the focuser
//!
//! These are what the device streams to the host while a command is being
//! processed: progress text, position updates and property state changes.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::types::{PropertyId, PropertyState};

/// Longest status message carried on the link
pub const MAX_TEXT_LEN: usize = 96;

/// Fixed-capacity message text
pub type Text = String<MAX_TEXT_LEN>;

/// Build a message text, truncating at a character boundary if too long
pub fn text(s: &str) -> Text {
    let mut out = Text::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Device-originated notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// Human-readable progress or error text, optionally tagged with the
    /// absolute position it refers to
    Message {
        text: Text,
        position: Option<u32>,
    },
    /// A property changed state
    Status {
        property: PropertyId,
        state: PropertyState,
    },
}

impl Notification {
    /// Create a plain message
    pub fn message(s: &str) -> Self {
        Notification::Message {
            text: text(s),
            position: None,
        }
    }

    /// Check if this notification reports a position
    pub fn position(&self) -> Option<u32> {
        match self {
            Notification::Message { position, .. } => *position,
            Notification::Status { .. } => None,
        }
    }

    /// Check if this notification is a property state change
    pub fn is_status(&self) -> bool {
        matches!(self, Notification::Status { .. })
    }
}
