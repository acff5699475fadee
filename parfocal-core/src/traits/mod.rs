//! Hardware abstraction traits
//!
//! These traits define the interface between the focuser logic
//! and hardware-specific implementations.

pub mod status;
pub mod stepper;

pub use status::StatusSink;
pub use stepper::{Direction, StepperDriver, StepperError};
