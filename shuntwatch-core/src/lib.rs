//! Board-agnostic core logic for the power monitor firmware
//!
//! This crate contains everything that does not depend on a specific bus
//! or chip:
//!
//! - Monitor configuration types, validation and parsing
//! - The measurement snapshot reported to consumers
//! - Power monitor and time base traits

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod measurement;
pub mod traits;

pub use measurement::Measurement;
