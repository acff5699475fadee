//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod focuser;
pub mod link_rx;
pub mod link_tx;

pub use focuser::{focuser_task, BoardMotorHat};
pub use link_rx::link_rx_task;
pub use link_tx::link_tx_task;
