//! Report task
//!
//! Receives sampling results and logs them as key/value status lines.

use defmt::*;
use heapless::{String, Vec};

use shuntwatch_core::config::{MAX_MONITORS, MAX_NAME_LEN};

use crate::channels::REPORT_CHANNEL;

/// Monitor names indexed by report slot
pub type MonitorNames = Vec<String<MAX_NAME_LEN>, MAX_MONITORS>;

/// Report task
#[embassy_executor::task]
pub async fn report_task(names: MonitorNames) {
    info!("Report task started");

    loop {
        let report = REPORT_CHANNEL.receive().await;
        let name = names.get(report.slot).map(|n| n.as_str()).unwrap_or("?");

        for (key, value) in report.status.status() {
            info!(
                "[{}] t={}ms {}={}",
                name, report.print_time_ms, key, value
            );
        }
    }
}
