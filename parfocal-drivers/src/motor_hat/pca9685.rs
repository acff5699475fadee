//! PCA9685 16-channel PWM controller (I2C)
//!
//! The Motor HAT uses the PCA9685 both for the H-bridge enable PWM and, by
//! driving channels fully on or fully off, as plain logic outputs for the
//! bridge inputs.
//!
//! # Register Layout
//!
//! Each output has four registers starting at `LED0_ON_L + 4 * channel`:
//! ON_L, ON_H, OFF_L, OFF_H. Counts are 12-bit; bit 4 of the `_H` register
//! (value 4096) forces the output fully on or fully off.

use embedded_hal::delay::DelayNs;
use parfocal_hal::I2cBus;

/// PCA9685 register addresses
pub mod reg {
    /// Mode register 1
    pub const MODE1: u8 = 0x00;
    /// Mode register 2
    pub const MODE2: u8 = 0x01;
    /// First output register (LED0_ON_L)
    pub const LED0_ON_L: u8 = 0x06;
    /// All-outputs ON low byte
    pub const ALL_LED_ON_L: u8 = 0xFA;
    /// All-outputs OFF low byte
    pub const ALL_LED_OFF_L: u8 = 0xFC;
    /// PWM frequency prescaler
    pub const PRESCALE: u8 = 0xFE;
}

/// MODE1 / MODE2 bits
pub mod mode {
    /// MODE1: respond to the all-call address
    pub const ALLCALL: u8 = 0x01;
    /// MODE1: oscillator off
    pub const SLEEP: u8 = 0x10;
    /// MODE1: register auto-increment
    pub const AI: u8 = 0x20;
    /// MODE1: restart PWM channels
    pub const RESTART: u8 = 0x80;
    /// MODE2: totem-pole outputs
    pub const OUTDRV: u8 = 0x04;
}

/// Default Motor HAT I2C address
pub const DEFAULT_ADDRESS: u8 = 0x60;

/// Number of PWM outputs
pub const CHANNELS: u8 = 16;

/// Full-scale PWM count; as an ON or OFF value it forces the output
pub const FULL: u16 = 4096;

/// Internal oscillator frequency in Hz
const OSCILLATOR_HZ: u32 = 25_000_000;

/// PCA9685 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pca9685Error {
    /// I2C transfer failed
    Bus,
    /// Output index above 15
    InvalidChannel,
}

/// Prescaler value for a PWM frequency
///
/// `round(25 MHz / (4096 * freq)) - 1`, clamped to the chip's 3..=255.
pub fn prescale_for(frequency_hz: u16) -> u8 {
    if frequency_hz == 0 {
        return u8::MAX;
    }
    let scaled = OSCILLATOR_HZ * 10 / (4096 * frequency_hz as u32);
    let rounded = (scaled + 5) / 10;
    rounded.saturating_sub(1).clamp(3, 255) as u8
}

/// PCA9685 driver
pub struct Pca9685<I> {
    i2c: I,
    address: u8,
}

impl<I: I2cBus> Pca9685<I> {
    /// Create a driver for the device at `address`
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Get the device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the bus
    pub fn free(self) -> I {
        self.i2c
    }

    /// Reset the outputs, wake the oscillator and set the PWM frequency
    pub fn init<D: DelayNs>(
        &mut self,
        delay: &mut D,
        frequency_hz: u16,
    ) -> Result<(), Pca9685Error> {
        self.set_all_pwm(0, 0)?;
        self.write_register(reg::MODE2, mode::OUTDRV)?;
        self.write_register(reg::MODE1, mode::ALLCALL)?;
        delay.delay_ms(5);

        let mode1 = self.read_register(reg::MODE1)? & !mode::SLEEP;
        self.write_register(reg::MODE1, mode1)?;
        delay.delay_ms(5);

        self.set_frequency(delay, frequency_hz)
    }

    /// Set the PWM frequency
    ///
    /// The prescaler can only be written while the oscillator sleeps.
    pub fn set_frequency<D: DelayNs>(
        &mut self,
        delay: &mut D,
        frequency_hz: u16,
    ) -> Result<(), Pca9685Error> {
        let old_mode = self.read_register(reg::MODE1)?;
        let sleep_mode = (old_mode & !mode::RESTART) | mode::SLEEP;
        self.write_register(reg::MODE1, sleep_mode)?;
        self.write_register(reg::PRESCALE, prescale_for(frequency_hz))?;
        self.write_register(reg::MODE1, old_mode)?;
        delay.delay_ms(5);
        self.write_register(reg::MODE1, old_mode | mode::RESTART | mode::AI)
    }

    /// Set the ON and OFF counts of one output
    pub fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Pca9685Error> {
        if channel >= CHANNELS {
            return Err(Pca9685Error::InvalidChannel);
        }
        self.write_counts(reg::LED0_ON_L + 4 * channel, on, off)
    }

    /// Set the ON and OFF counts of every output at once
    pub fn set_all_pwm(&mut self, on: u16, off: u16) -> Result<(), Pca9685Error> {
        self.write_counts(reg::ALL_LED_ON_L, on, off)
    }

    /// Drive an output as a logic level
    pub fn set_pin(&mut self, channel: u8, high: bool) -> Result<(), Pca9685Error> {
        if high {
            self.set_pwm(channel, FULL, 0)
        } else {
            self.set_pwm(channel, 0, FULL)
        }
    }

    /// Force every output fully off
    pub fn release_all(&mut self) -> Result<(), Pca9685Error> {
        self.set_all_pwm(0, FULL)
    }

    // ON_L, ON_H, OFF_L, OFF_H from `start` (the ALL_LED block is laid out
    // the same way with OFF_L at ALL_LED_OFF_L)
    fn write_counts(&mut self, start: u8, on: u16, off: u16) -> Result<(), Pca9685Error> {
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.i2c
            .write(self.address, &[start, on_l, on_h, off_l, off_h])
            .map_err(|_| Pca9685Error::Bus)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Pca9685Error> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| Pca9685Error::Bus)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Pca9685Error> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .map_err(|_| Pca9685Error::Bus)?;
        Ok(value[0])
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{CountingDelay, MockPca9685};
    use super::*;

    #[test]
    fn test_prescale_for_motor_hat_frequency() {
        assert_eq!(prescale_for(1600), 3);
        assert_eq!(prescale_for(50), 121);
        assert_eq!(prescale_for(1000), 5);
    }

    #[test]
    fn test_prescale_clamped() {
        assert_eq!(prescale_for(10_000), 3);
        assert_eq!(prescale_for(1), 255);
        assert_eq!(prescale_for(0), 255);
    }

    #[test]
    fn test_init_wakes_and_sets_frequency() {
        let mut pwm = Pca9685::new(MockPca9685::new(), DEFAULT_ADDRESS);
        let mut delay = CountingDelay::default();
        pwm.init(&mut delay, 1600).unwrap();

        let bus = pwm.free();
        assert_eq!(bus.registers[reg::PRESCALE as usize], 3);
        assert_eq!(bus.registers[reg::MODE2 as usize], mode::OUTDRV);
        let mode1 = bus.registers[reg::MODE1 as usize];
        assert_eq!(mode1 & mode::SLEEP, 0);
        assert_ne!(mode1 & mode::AI, 0);
        assert!(delay.total_ns >= 15_000_000);
    }

    #[test]
    fn test_set_pin_levels() {
        let mut pwm = Pca9685::new(MockPca9685::new(), DEFAULT_ADDRESS);
        pwm.set_pin(9, true).unwrap();
        pwm.set_pin(10, false).unwrap();

        let bus = pwm.free();
        assert_eq!(bus.counts(9), (4096, 0));
        assert_eq!(bus.counts(10), (0, 4096));
    }

    #[test]
    fn test_set_pwm_counts() {
        let mut pwm = Pca9685::new(MockPca9685::new(), DEFAULT_ADDRESS);
        pwm.set_pwm(8, 0, 255 * 16).unwrap();
        assert_eq!(pwm.free().counts(8), (0, 4080));
    }

    #[test]
    fn test_invalid_channel() {
        let mut pwm = Pca9685::new(MockPca9685::new(), DEFAULT_ADDRESS);
        assert_eq!(pwm.set_pwm(16, 0, 0), Err(Pca9685Error::InvalidChannel));
        assert_eq!(pwm.free().writes, 0);
    }

    #[test]
    fn test_release_all_forces_outputs_off() {
        let mut pwm = Pca9685::new(MockPca9685::new(), DEFAULT_ADDRESS);
        pwm.set_pin(4, true).unwrap();
        pwm.set_pin(11, true).unwrap();
        pwm.release_all().unwrap();

        let bus = pwm.free();
        for ch in 0..CHANNELS {
            assert_eq!(bus.counts(ch), (0, FULL));
        }
    }

    #[test]
    fn test_bus_error_reported() {
        let mut bus = MockPca9685::new();
        bus.fail = true;
        let mut pwm = Pca9685::new(bus, DEFAULT_ADDRESS);
        assert_eq!(pwm.release_all(), Err(Pca9685Error::Bus));
    }
}
