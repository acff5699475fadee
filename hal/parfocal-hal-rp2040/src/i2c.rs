//! Blocking I2C master for RP2040
//!
//! The Motor HAT is driven from the controller task, which already runs a
//! move to completion before it looks at the next command, so the bus is
//! used in blocking mode. Implements `parfocal_hal::I2cBus`.

use embassy_rp::i2c::{Blocking, Config, Error, I2c, Instance, SclPin, SdaPin};
use embassy_rp::Peri;
use parfocal_hal::{I2cBus, I2cConfig};

/// RP2040 I2C bus in blocking mode
pub struct Rp2040I2c<'d, T: Instance> {
    i2c: I2c<'d, T, Blocking>,
}

impl<'d, T: Instance> Rp2040I2c<'d, T> {
    /// Create a blocking I2C master on the given pins
    pub fn new(
        peri: Peri<'d, T>,
        scl: Peri<'d, impl SclPin<T>>,
        sda: Peri<'d, impl SdaPin<T>>,
        config: I2cConfig,
    ) -> Self {
        let mut cfg = Config::default();
        cfg.frequency = config.frequency;
        Self {
            i2c: I2c::new_blocking(peri, scl, sda, cfg),
        }
    }
}

impl<'d, T: Instance> I2cBus for Rp2040I2c<'d, T> {
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.blocking_write(address, data)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.blocking_write_read(address, write_data, read_buf)
    }
}
