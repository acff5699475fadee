//! I2C bus abstraction
//!
//! Register-oriented master operations, which is all the PCA9685 needs:
//! a register write carries the register index as its first byte, and a
//! register read is a one-byte write followed by a repeated-start read.

/// I2C bus master
pub trait I2cBus {
    /// Bus error reported by the chip HAL
    type Error;

    /// Write `data` to the 7-bit `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Write `write_data`, then read into `read_buf` after a repeated start
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Bus clock settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    /// SCL frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// 100 kHz
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// 400 kHz, the PCA9685's usual rate
    pub const FAST: Self = Self { frequency: 400_000 };
}
