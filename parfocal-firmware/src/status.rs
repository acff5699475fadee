//! Status sink backed by the outgoing link channel

use defmt::*;

use parfocal_core::traits::StatusSink;
use parfocal_protocol::{text, DeviceMessage, Notification, PropertyId, PropertyState};

use crate::channels::OUTGOING;

/// Forwards controller notifications to the host link
///
/// Never blocks: a notification that does not fit the channel is dropped.
pub struct LinkSink;

impl LinkSink {
    fn push(&mut self, notification: Notification) {
        if OUTGOING
            .try_send(DeviceMessage::Notification(notification))
            .is_err()
        {
            warn!("Outgoing channel full, dropping notification");
        }
    }
}

impl StatusSink for LinkSink {
    fn notify(&mut self, message: &str, position: Option<u32>) {
        debug!("{=str}", message);
        self.push(Notification::Message {
            text: text(message),
            position,
        });
    }

    fn set_status(&mut self, property: PropertyId, state: PropertyState) {
        trace!("{:?} -> {:?}", property, state);
        self.push(Notification::Status { property, state });
    }
}
