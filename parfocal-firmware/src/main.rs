//! Parfocal - Motor HAT Focuser Firmware
//!
//! Drives a focuser stepper through an Adafruit Motor HAT (PCA9685 over
//! I2C) from an RP2040 board, taking commands from the host over UART.
//!
//! Named after the optical term "parfocal": a lens that stays in focus as
//! it is adjusted.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use parfocal_core::traits::StepperDriver;
use parfocal_drivers::{MotorHat, MotorHatConfig};
use parfocal_hal::I2cConfig;
use parfocal_hal_rp2040::flash::Rp2040FlashStorage;
use parfocal_hal_rp2040::i2c::Rp2040I2c;

mod channels;
mod config;
mod status;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Parfocal firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Host link on UART0 (GPIO0 TX, GPIO1 RX), 115200 baud default
    let uart_config = UartConfig::default();

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for host link");

    // Motor HAT on I2C0 (GPIO4 SDA, GPIO5 SCL)
    let i2c = Rp2040I2c::new(p.I2C0, p.PIN_5, p.PIN_4, I2cConfig::FAST);
    let hat_config = MotorHatConfig::default();
    info!(
        "Motor HAT at 0x{:02x}, {} Hz PWM, {} steps/rev",
        hat_config.address, hat_config.pwm_frequency_hz, hat_config.steps_per_revolution
    );

    let mut hat: tasks::BoardMotorHat = MotorHat::new(i2c, Delay, hat_config);
    // Outputs off at power-up; connect brings the board up again
    match hat.init() {
        Ok(()) => info!("Motor HAT initialized"),
        Err(e) => error!("Motor HAT init failed: {:?}", e),
    }

    let storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);

    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner.spawn(tasks::link_tx_task(tx)).unwrap();
    spawner.spawn(tasks::focuser_task(hat, storage)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
