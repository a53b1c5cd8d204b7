//! Hardware abstraction traits
//!
//! These traits define the interface between the sensor drivers and the
//! application layer that schedules and reports them.

pub mod power;
pub mod time;

pub use power::{PowerMonitor, StatusCallback};
pub use time::{SessionClock, TimeBase};
