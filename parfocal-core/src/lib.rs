//! Board-agnostic focuser logic
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (stepper, status sink)
//! - Focuser controller: position tracking, range limits, backlash
//! - Persisted settings record and its flash load/save
//! - Host command dispatch

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod focuser;
pub mod traits;

pub use command::dispatch;
pub use focuser::{FocuserController, FocuserError, FocuserState, MoveOutcome};
