//! Frame encoding and decoding for the host link.
//!
//! Messages are serialized with postcard and COBS-encoded, so the only zero
//! byte on the wire is the frame delimiter. A receiver that starts mid-frame
//! resynchronizes at the next delimiter.

use heapless::Vec;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Maximum encoded frame size, delimiter included
pub const MAX_FRAME_SIZE: usize = 192;

/// Errors that can occur during frame encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Message did not fit the output buffer
    BufferTooSmall,
    /// Frame bytes are not a valid message
    InvalidFrame,
    /// Frame exceeded [`MAX_FRAME_SIZE`] before its delimiter
    FrameTooLarge,
}

/// Encode a message into `buffer`, returning the framed bytes
pub fn encode<'a, T: Serialize>(
    message: &T,
    buffer: &'a mut [u8],
) -> Result<&'a mut [u8], CodecError> {
    postcard::to_slice_cobs(message, buffer).map_err(|_| CodecError::BufferTooSmall)
}

/// Decode a message from a complete frame (decoded in place)
pub fn decode<T: DeserializeOwned>(frame: &mut [u8]) -> Result<T, CodecError> {
    postcard::from_bytes_cobs(frame).map_err(|_| CodecError::InvalidFrame)
}

/// Collects link bytes into complete frames
#[derive(Debug, Clone, Default)]
pub struct FrameAccumulator {
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    overflowed: bool,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any partial frame
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` when a delimiter completes a frame,
    /// `Ok(None)` when more bytes are needed, or `Err` when the frame that
    /// just ended was too long (its bytes are dropped).
    pub fn feed(&mut self, byte: u8) -> Result<Option<Vec<u8, MAX_FRAME_SIZE>>, CodecError> {
        if byte != 0 {
            if self.buffer.push(byte).is_err() {
                self.overflowed = true;
            }
            return Ok(None);
        }

        if self.overflowed {
            self.reset();
            return Err(CodecError::FrameTooLarge);
        }

        // Back-to-back delimiters carry no frame
        if self.buffer.is_empty() {
            return Ok(None);
        }

        if self.buffer.push(0).is_err() {
            self.reset();
            return Err(CodecError::FrameTooLarge);
        }

        let frame = core::mem::take(&mut self.buffer);
        Ok(Some(frame))
    }

    /// Feed multiple bytes, returning the first complete frame
    ///
    /// Bytes after a complete frame are not consumed; the number of bytes
    /// consumed is returned alongside the frame.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> (usize, Result<Option<Vec<u8, MAX_FRAME_SIZE>>, CodecError>) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                other => return (i + 1, other),
            }
        }
        (bytes.len(), Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Notification;
    use crate::messages::{Command, DeviceMessage, Response};
    use crate::types::{FocusDirection, PropertyId};

    #[test]
    fn test_encoded_frame_has_single_delimiter() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let frame = encode(&Command::MoveAbsolute(0), &mut buf).unwrap();
        let zeros = frame.iter().filter(|&&b| b == 0).count();
        assert_eq!(zeros, 1);
        assert_eq!(*frame.last().unwrap(), 0);
    }

    #[test]
    fn test_accumulator_yields_command() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let cmd = Command::MoveRelative {
            direction: FocusDirection::Inward,
            ticks: 250,
        };
        let encoded = encode(&cmd, &mut buf).unwrap();

        let mut acc = FrameAccumulator::new();
        let (used, result) = acc.feed_bytes(encoded);
        assert_eq!(used, encoded.len());
        let mut frame = result.unwrap().unwrap();
        let decoded: Command = decode(&mut frame).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn test_accumulator_resync_after_garbage() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let encoded = encode(&Command::Abort, &mut buf).unwrap();

        let mut data = Vec::<u8, 64>::new();
        // A partial frame cut short by a delimiter, then the real frame
        data.extend_from_slice(&[0x12, 0x34, 0x00]).unwrap();
        data.extend_from_slice(encoded).unwrap();

        let mut acc = FrameAccumulator::new();
        let (used, first) = acc.feed_bytes(&data);
        assert_eq!(used, 3);
        let mut garbage = first.unwrap().unwrap();
        assert!(decode::<Command>(&mut garbage).is_err());

        let (_, second) = acc.feed_bytes(&data[used..]);
        let mut frame = second.unwrap().unwrap();
        assert_eq!(decode::<Command>(&mut frame).unwrap(), Command::Abort);
    }

    #[test]
    fn test_accumulator_ignores_empty_frames() {
        let mut acc = FrameAccumulator::new();
        assert_eq!(acc.feed(0), Ok(None));
        assert_eq!(acc.feed(0), Ok(None));
    }

    #[test]
    fn test_oversized_frame_dropped() {
        let mut acc = FrameAccumulator::new();
        for _ in 0..(MAX_FRAME_SIZE + 10) {
            assert_eq!(acc.feed(0x55), Ok(None));
        }
        assert_eq!(acc.feed(0), Err(CodecError::FrameTooLarge));

        // Next frame is accepted again
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let encoded = encode(&Command::Connect, &mut buf).unwrap();
        let (_, result) = acc.feed_bytes(encoded);
        assert!(result.unwrap().is_some());
    }

    #[test]
    fn test_device_message_fits_frame() {
        // Longest message text plus position must still fit one frame
        let msg: DeviceMessage = Response::alert(
            PropertyId::AbsolutePosition,
            "Requested position is out of range. Requested position is out of range. Requested position ...",
        )
        .with_position(20000)
        .into();
        let mut buf = [0u8; MAX_FRAME_SIZE];
        assert!(encode(&msg, &mut buf).is_ok());

        let note: DeviceMessage = Notification::message("Focuser parking...").into();
        assert!(encode(&note, &mut buf).is_ok());
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 2];
        let msg: DeviceMessage = Notification::message("a message longer than two bytes").into();
        assert_eq!(encode(&msg, &mut buf).unwrap_err(), CodecError::BufferTooSmall);
    }
}
