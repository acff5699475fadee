//! Host link receive task
//!
//! Reassembles frames from the UART and forwards decoded commands to the
//! focuser task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use parfocal_protocol::{decode, Command, FrameAccumulator};

use crate::channels::COMMANDS;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - receives and decodes host commands
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut accumulator = FrameAccumulator::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match accumulator.feed(byte) {
                        Ok(Some(mut frame)) => match decode::<Command>(&mut frame) {
                            Ok(command) => {
                                debug!("Command: {:?}", command);
                                COMMANDS.send(command).await;
                            }
                            Err(e) => {
                                warn!("Failed to decode command: {:?}", e);
                            }
                        },
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Frame error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
