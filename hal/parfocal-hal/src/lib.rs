//! Parfocal Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the focuser needs from
//! a chip-specific HAL. Only two peripherals matter to a Motor HAT focuser:
//! the I2C bus the PWM controller hangs off, and a persistent store for the
//! focuser settings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (parfocal-firmware)        │
//! └─────────────────────────────────────────┘
//!           │                     │
//!           ▼                     ▼
//! ┌──────────────────┐  ┌──────────────────┐
//! │ parfocal-drivers │  │  parfocal-core   │
//! │   (I2cBus)       │  │ (FlashStorage)   │
//! └──────────────────┘  └──────────────────┘
//!           │                     │
//!           └──────────┬──────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │  parfocal-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                      │
//!                      ▼
//!           ┌─────────────────────┐
//!           │ parfocal-hal-rp2040 │
//!           └─────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`flash::FlashStorage`] - Persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use i2c::{I2cBus, I2cConfig};
