//! Adafruit-style DC & Stepper Motor HAT
//!
//! A PCA9685 PWM controller at I2C address 0x60 drives two TB6612 dual
//! H-bridges, giving two bipolar stepper ports (A = M1/M2, B = M3/M4).

pub mod pca9685;
pub mod stepper;

pub use pca9685::{Pca9685, Pca9685Error};
pub use stepper::{MotorHat, MotorHatConfig, StepperPins, MICROSTEPS};
