//! Focuser position control
//!
//! The controller tracks the absolute position of the focuser, enforces the
//! travel limits and turns each requested move into stepper commands,
//! taking up gear backlash whenever the direction of travel reverses.

pub mod controller;
pub mod error;
pub mod plan;
pub mod state;

pub use controller::FocuserController;
pub use error::{FocuserError, MoveOutcome};
pub use plan::{steps_for_duration, MovePlan};
pub use state::*;
