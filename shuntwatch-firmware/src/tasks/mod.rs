//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod power_monitor;
pub mod report;

pub use power_monitor::{power_monitor_task, MonitorBus};
pub use report::{report_task, MonitorNames};
