//! Shuntwatch Hardware Abstraction Layer
//!
//! This crate defines the bus traits the sensor drivers are written
//! against. Chip-specific HALs implement them directly, or any
//! `embedded-hal` 1.0 blocking bus can be wrapped in
//! [`i2c::EmbeddedHalBus`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (shuntwatch-firmware)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  shuntwatch-drivers (INA226 driver)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  shuntwatch-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embedded-hal I2C (embassy-rp, ...)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;

// Re-export key items at crate root for convenience
pub use i2c::{EmbeddedHalBus, I2cBus, I2cBusError};
