//! Focuser task
//!
//! Owns the focuser controller and the settings flash. Commands are run one
//! at a time, each to completion, and answered in order.

use defmt::*;
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

use parfocal_core::config::FocuserSettings;
use parfocal_core::{dispatch, FocuserController};
use parfocal_drivers::MotorHat;
use parfocal_hal_rp2040::flash::Rp2040FlashStorage;
use parfocal_hal_rp2040::i2c::Rp2040I2c;
use parfocal_protocol::{Command, DeviceMessage};

use crate::channels::{COMMANDS, OUTGOING};
use crate::config::{load_focuser_settings, save_focuser_settings};
use crate::status::LinkSink;

/// Motor HAT on the board's I2C0 bus
pub type BoardMotorHat = MotorHat<Rp2040I2c<'static, I2C0>, Delay>;

/// Focuser task - runs host commands against the Motor HAT
#[embassy_executor::task]
pub async fn focuser_task(hat: BoardMotorHat, mut storage: Rp2040FlashStorage<'static>) {
    info!("Focuser task started");

    let mut focuser = FocuserController::new(hat, LinkSink);
    let mut saved = load_focuser_settings(&mut storage).await;
    focuser.apply_settings(&saved);
    info!("Focuser position {}", focuser.position());

    loop {
        let command = COMMANDS.receive().await;
        let explicit_save = matches!(command, Command::SaveConfig);

        let response = dispatch(&mut focuser, command);
        if response.is_ok() {
            debug!("{:?} ok", command);
        } else {
            warn!("{:?} failed: {:?}", command, response.message);
        }
        OUTGOING.send(DeviceMessage::Response(response)).await;

        if command.persists_config() {
            persist(&mut storage, focuser.settings(), &mut saved, explicit_save).await;
        }
    }
}

/// Write the settings if they changed since the last save
async fn persist(
    storage: &mut Rp2040FlashStorage<'static>,
    mut settings: FocuserSettings,
    saved: &mut FocuserSettings,
    force: bool,
) {
    if !force && settings == *saved {
        trace!("Settings unchanged, skipping flash write");
        return;
    }

    if save_focuser_settings(storage, &mut settings).await {
        *saved = settings;
    }
}
