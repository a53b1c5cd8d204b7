//! Power monitor traits

use crate::measurement::Measurement;

/// Reporting callback invoked once per sampling cycle
///
/// Receives the print time in milliseconds and the snapshot produced by
/// the cycle (all zeros if the cycle failed).
pub type StatusCallback = fn(print_time_ms: u64, status: &Measurement);

/// Trait for polled power monitors
///
/// Implementations keep the most recent snapshot so consumers can read it
/// between sampling cycles without touching the bus.
pub trait PowerMonitor {
    /// Monitor name from the configuration
    fn name(&self) -> &str;

    /// Most recent snapshot
    ///
    /// Never triggers a bus transaction.
    fn snapshot(&self) -> Measurement;

    /// Check if the snapshot came from a successful sampling cycle
    ///
    /// A failed cycle also zeroes the snapshot, so this is the only way to
    /// tell a real zero reading from an unavailable sensor.
    fn is_valid(&self) -> bool;
}
