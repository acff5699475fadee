//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in parfocal-core:
//!
//! - Motor HAT stepper driver (PCA9685 + TB6612 over I2C)

#![no_std]
#![deny(unsafe_code)]

pub mod motor_hat;

pub use motor_hat::{MotorHat, MotorHatConfig};
