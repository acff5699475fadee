//! Host link transmit task
//!
//! Sends responses and notifications to the host in the order they were
//! queued.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use parfocal_protocol::{encode, MAX_FRAME_SIZE};

use crate::channels::OUTGOING;

/// Link TX task - frames and writes outgoing messages
#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Link TX task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];

    loop {
        let message = OUTGOING.receive().await;

        let frame = match encode(&message, &mut buf) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode {:?}: {:?}", message, e);
                continue;
            }
        };

        let len = frame.len();
        match tx.write_all(frame).await {
            Ok(()) => trace!("TX: {} bytes", len),
            Err(e) => warn!("UART write error: {:?}", e),
        }
    }
}
