//! Focuser host link protocol
//!
//! This crate defines the vocabulary exchanged between the device-control
//! host and the focuser firmware. It mirrors a property-based control
//! protocol: the host sets number/switch properties, the device answers with
//! the property's new state and streams free-form status notifications.
//!
//! # Protocol Overview
//!
//! Every message is serialized with postcard and framed with COBS, so a
//! frame on the wire is simply:
//! ```text
//! ┌──────────────────────────────┬──────┐
//! │ COBS(postcard(message))      │ 0x00 │
//! └──────────────────────────────┴──────┘
//! ```
//!
//! Host → device messages are [`Command`]s; device → host messages are
//! [`DeviceMessage`]s (a [`Response`] per command plus any number of
//! [`Notification`]s emitted while the command runs).

#![no_std]
#![deny(unsafe_code)]

pub mod codec;
pub mod events;
pub mod messages;
pub mod types;

pub use codec::{decode, encode, CodecError, FrameAccumulator, MAX_FRAME_SIZE};
pub use events::{text, Notification, Text, MAX_TEXT_LEN};
pub use messages::{Command, DeviceMessage, Response};
pub use types::{
    FocusDirection, MotorPolarity, PropertyId, PropertyState, StepStyle, StepperChannel,
};
