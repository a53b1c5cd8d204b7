//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in shuntwatch-core for power monitoring hardware:
//!
//! - INA226 current/voltage/power monitor (I2C)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod power;
