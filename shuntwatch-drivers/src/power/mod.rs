//! Power monitor implementations

pub mod ina226;

pub use ina226::{DriverState, Ina226};
