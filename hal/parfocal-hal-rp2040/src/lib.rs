//! RP2040-specific HAL for the focuser firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `parfocal-hal` traits:
//!
//! - Blocking I2C master for the Motor HAT (implements `parfocal_hal::I2cBus`)
//! - Flash storage driver (implements `parfocal_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod i2c;

// Re-export shared traits from parfocal-hal for convenience
pub use parfocal_hal::{FlashStorage as FlashStorageTrait, I2cBus, StorageKey};
