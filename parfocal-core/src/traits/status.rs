//! Status reporting trait

use parfocal_protocol::{PropertyId, PropertyState};

/// Receiver of focuser progress reports
///
/// The controller calls this while an operation runs; the firmware forwards
/// each report to the host as it happens.
pub trait StatusSink {
    /// Report human-readable text, optionally tagged with a position
    fn notify(&mut self, message: &str, position: Option<u32>);

    /// Report a property state transition
    fn set_status(&mut self, property: PropertyId, state: PropertyState);
}
