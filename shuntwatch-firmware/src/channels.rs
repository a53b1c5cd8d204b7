//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use shuntwatch_core::config::MAX_MONITORS;
use shuntwatch_core::measurement::Measurement;
use shuntwatch_core::traits::StatusCallback;

/// Channel capacity for monitor reports
const REPORT_CHANNEL_SIZE: usize = 8;

/// One sampling cycle result, tagged with the monitor's slot
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct Report {
    /// Index of the monitor in the sampling task
    pub slot: usize,
    /// Print time of the cycle (ms)
    pub print_time_ms: u64,
    /// Snapshot produced by the cycle
    pub status: Measurement,
}

/// Reports from the power monitor task to the report task
pub static REPORT_CHANNEL: Channel<CriticalSectionRawMutex, Report, REPORT_CHANNEL_SIZE> =
    Channel::new();

/// Forward a cycle result for `SLOT` into [`REPORT_CHANNEL`]
///
/// Reports are dropped when the channel is full.
fn forward_report<const SLOT: usize>(print_time_ms: u64, status: &Measurement) {
    let report = Report {
        slot: SLOT,
        print_time_ms,
        status: *status,
    };
    if REPORT_CHANNEL.try_send(report).is_err() {
        defmt::warn!("Report channel full, dropping report for slot {}", SLOT);
    }
}

/// Per-slot reporting callbacks
pub const REPORT_CALLBACKS: [StatusCallback; MAX_MONITORS] = [
    forward_report::<0>,
    forward_report::<1>,
    forward_report::<2>,
    forward_report::<3>,
];
