//! Motor HAT bipolar stepper driver
//!
//! Each stepper port is one TB6612 dual H-bridge: two PWM outputs set the
//! coil current and four logic outputs set the coil polarity. The coil
//! phase is tracked in microsteps (8 per full step, 32 per electrical
//! cycle) so that every step style can continue from wherever the last
//! move left the rotor.
//!
//! # Step Styles
//!
//! | Style      | Phase advance | Coils on  | Delay per call  |
//! |------------|---------------|-----------|-----------------|
//! | Single     | 8             | 1         | 1 step          |
//! | Double     | 8             | 2         | 1 step          |
//! | Interleave | 4             | 1 or 2    | 1/2 step        |
//! | Microstep  | 1             | weighted  | 1/8 step        |

use embedded_hal::delay::DelayNs;
use parfocal_core::traits::{Direction, StepperDriver, StepperError};
use parfocal_hal::I2cBus;
use parfocal_protocol::{StepStyle, StepperChannel};

use super::pca9685::{Pca9685, Pca9685Error, DEFAULT_ADDRESS};

/// Microsteps per full step
pub const MICROSTEPS: u8 = 8;

/// Microsteps per electrical cycle (four full steps)
const CYCLE: u8 = MICROSTEPS * 4;

/// Half a full step in microsteps
const HALF_STEP: u8 = MICROSTEPS / 2;

/// Coil current weights for one quarter cycle
pub const MICROSTEP_CURVE: [u8; MICROSTEPS as usize + 1] =
    [0, 50, 98, 142, 180, 212, 236, 250, 255];

/// Coil pattern per half step, in write order AIN2, BIN1, AIN1, BIN2
const STEP_COILS: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// PCA9685 outputs wired to one stepper port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperPins {
    pub pwm_a: u8,
    pub ain2: u8,
    pub ain1: u8,
    pub pwm_b: u8,
    pub bin2: u8,
    pub bin1: u8,
}

impl StepperPins {
    /// Port M1/M2
    pub const CHANNEL_A: Self = Self {
        pwm_a: 8,
        ain2: 9,
        ain1: 10,
        pwm_b: 13,
        bin2: 12,
        bin1: 11,
    };

    /// Port M3/M4
    pub const CHANNEL_B: Self = Self {
        pwm_a: 2,
        ain2: 3,
        ain1: 4,
        pwm_b: 7,
        bin2: 6,
        bin1: 5,
    };

    pub const fn for_channel(channel: StepperChannel) -> Self {
        match channel {
            StepperChannel::A => Self::CHANNEL_A,
            StepperChannel::B => Self::CHANNEL_B,
        }
    }
}

/// Motor HAT configuration
#[derive(Debug, Clone)]
pub struct MotorHatConfig {
    /// I2C address of the PCA9685
    pub address: u8,
    /// PWM frequency in Hz
    pub pwm_frequency_hz: u16,
    /// Full steps per motor revolution
    pub steps_per_revolution: u16,
}

impl Default for MotorHatConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            pwm_frequency_hz: 1600,
            steps_per_revolution: 400,
        }
    }
}

/// Coil outputs for one phase position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoilDrive {
    /// Bridge A current weight (0-255)
    pub pwm_a: u8,
    /// Bridge B current weight (0-255)
    pub pwm_b: u8,
    /// Logic levels in write order AIN2, BIN1, AIN1, BIN2
    pub coils: [bool; 4],
}

/// Advance the coil phase by one call of `style`
///
/// Single lands on even half steps (one coil), double on odd half steps
/// (two coils); if the phase is on the other kind it first moves by half a
/// step to get back in line. That half step is still one call, so it counts
/// as a whole step to the caller.
pub fn advance_phase(phase: u8, direction: Direction, style: StepStyle) -> u8 {
    let on_odd_half_step = (phase / HALF_STEP) % 2 == 1;
    let delta = match style {
        StepStyle::Single if on_odd_half_step => HALF_STEP,
        StepStyle::Single => MICROSTEPS,
        StepStyle::Double if !on_odd_half_step => HALF_STEP,
        StepStyle::Double => MICROSTEPS,
        StepStyle::Interleave => HALF_STEP,
        StepStyle::Microstep => 1,
    };
    match direction {
        Direction::Forward => (phase + delta) % CYCLE,
        Direction::Backward => (phase + CYCLE - delta) % CYCLE,
    }
}

/// Coil outputs for a phase position
pub fn coil_drive(phase: u8, style: StepStyle) -> CoilDrive {
    let phase = phase % CYCLE;
    if style != StepStyle::Microstep {
        return CoilDrive {
            pwm_a: u8::MAX,
            pwm_b: u8::MAX,
            coils: STEP_COILS[(phase / HALF_STEP) as usize],
        };
    }

    let s = phase as usize;
    let m = MICROSTEPS as usize;
    let curve = &MICROSTEP_CURVE;
    let (pwm_a, pwm_b, coils) = match s / m {
        0 => (curve[m - s], curve[s], [true, true, false, false]),
        1 => (curve[s - m], curve[2 * m - s], [false, true, true, false]),
        2 => (curve[3 * m - s], curve[s - 2 * m], [false, false, true, true]),
        _ => (curve[s - 3 * m], curve[4 * m - s], [true, false, false, true]),
    };
    CoilDrive {
        pwm_a,
        pwm_b,
        coils,
    }
}

/// Per-port state
#[derive(Debug, Clone, Copy)]
struct PortState {
    /// Coil phase in microsteps (0-31)
    phase: u8,
    /// Delay after each full step in µs
    step_delay_us: u32,
}

impl PortState {
    const fn new() -> Self {
        Self {
            phase: 0,
            step_delay_us: 0,
        }
    }
}

impl From<Pca9685Error> for StepperError {
    fn from(e: Pca9685Error) -> Self {
        match e {
            Pca9685Error::Bus => StepperError::CommunicationError,
            Pca9685Error::InvalidChannel => StepperError::InvalidConfig,
        }
    }
}

/// Adafruit-style Motor HAT with two stepper ports
///
/// Steps are timed with busy-wait delays, so `step` blocks for the whole
/// move.
pub struct MotorHat<I, D> {
    pwm: Pca9685<I>,
    delay: D,
    config: MotorHatConfig,
    ports: [PortState; 2],
}

impl<I: I2cBus, D: DelayNs> MotorHat<I, D> {
    /// Create a driver; [`StepperDriver::init`] must succeed before stepping
    pub fn new(i2c: I, delay: D, config: MotorHatConfig) -> Self {
        Self {
            pwm: Pca9685::new(i2c, config.address),
            delay,
            config,
            ports: [PortState::new(); 2],
        }
    }

    /// Coil phase of a port in microsteps
    pub fn phase(&self, channel: StepperChannel) -> u8 {
        self.ports[channel.index()].phase
    }

    /// Delay after each full step on a port in µs (0 until a speed is set)
    pub fn step_delay_us(&self, channel: StepperChannel) -> u32 {
        self.ports[channel.index()].step_delay_us
    }

    /// Release the bus and delay
    pub fn free(self) -> (I, D) {
        (self.pwm.free(), self.delay)
    }

    /// Move the phase by one call of `style` and drive the coils
    fn one_step(
        &mut self,
        channel: StepperChannel,
        direction: Direction,
        style: StepStyle,
    ) -> Result<u8, Pca9685Error> {
        let port = &mut self.ports[channel.index()];
        port.phase = advance_phase(port.phase, direction, style);
        let phase = port.phase;

        let pins = StepperPins::for_channel(channel);
        let drive = coil_drive(phase, style);
        self.pwm.set_pwm(pins.pwm_a, 0, drive.pwm_a as u16 * 16)?;
        self.pwm.set_pwm(pins.pwm_b, 0, drive.pwm_b as u16 * 16)?;

        let [ain2, bin1, ain1, bin2] = drive.coils;
        self.pwm.set_pin(pins.ain2, ain2)?;
        self.pwm.set_pin(pins.bin1, bin1)?;
        self.pwm.set_pin(pins.ain1, ain1)?;
        self.pwm.set_pin(pins.bin2, bin2)?;

        Ok(phase)
    }
}

impl<I: I2cBus, D: DelayNs> StepperDriver for MotorHat<I, D> {
    /// Restart the PWM controller with every output off
    fn init(&mut self) -> Result<(), StepperError> {
        self.pwm.init(&mut self.delay, self.config.pwm_frequency_hz)?;
        self.pwm.release_all()?;
        Ok(())
    }

    fn set_speed_rpm(&mut self, channel: StepperChannel, rpm: u16) -> Result<(), StepperError> {
        let steps_per_minute = self.config.steps_per_revolution as u32 * rpm as u32;
        if steps_per_minute == 0 {
            return Err(StepperError::InvalidConfig);
        }
        self.ports[channel.index()].step_delay_us = 60_000_000 / steps_per_minute;
        Ok(())
    }

    fn step(
        &mut self,
        channel: StepperChannel,
        count: u32,
        direction: Direction,
        style: StepStyle,
    ) -> Result<(), StepperError> {
        let mut delay_us = self.ports[channel.index()].step_delay_us;
        let mut calls = count;
        match style {
            StepStyle::Interleave => delay_us /= 2,
            StepStyle::Microstep => {
                delay_us /= MICROSTEPS as u32;
                calls = count.saturating_mul(MICROSTEPS as u32);
            }
            StepStyle::Single | StepStyle::Double => {}
        }

        let mut phase = self.phase(channel);
        for _ in 0..calls {
            phase = self.one_step(channel, direction, style)?;
            self.delay.delay_us(delay_us);
        }

        // Finish on a full step so the rotor is not left between detents
        if style == StepStyle::Microstep {
            while phase % MICROSTEPS != 0 {
                phase = self.one_step(channel, direction, style)?;
                self.delay.delay_us(delay_us);
            }
        }

        Ok(())
    }

    fn release_all(&mut self) -> Result<(), StepperError> {
        self.pwm.release_all()?;
        Ok(())
    }
}
