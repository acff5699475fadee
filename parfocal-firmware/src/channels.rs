//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! The focuser controller is owned by the focuser task; the link tasks only
//! ever talk to it through these.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use parfocal_protocol::{Command, DeviceMessage};

/// Channel capacity for decoded host commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outgoing messages
///
/// Moves block the executor, so every notification a move emits has to fit
/// here until the move ends and the TX task runs again.
const OUTGOING_CHANNEL_SIZE: usize = 16;

/// Commands decoded from the host link
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Responses and notifications waiting to be sent to the host
pub static OUTGOING: Channel<CriticalSectionRawMutex, DeviceMessage, OUTGOING_CHANNEL_SIZE> =
    Channel::new();
