//! Shuntwatch - INA226 Power Monitor Firmware
//!
//! Main firmware binary for RP2040-based boards. Polls one or more INA226
//! monitors sharing I2C0 and reports shunt voltage, bus voltage, current
//! and power on a fixed cadence per monitor.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use heapless::{String, Vec};
use {defmt_rtt as _, panic_probe as _};

use shuntwatch_core::config::DEFAULT_I2C_SPEED;
use shuntwatch_core::traits::PowerMonitor;
use shuntwatch_hal::EmbeddedHalBus;

use crate::channels::REPORT_CALLBACKS;

/// Embedded monitor configuration (compiled into firmware)
/// Edit monitors.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../monitors.toml");

mod channels;
mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Shuntwatch firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let monitor_config = config::load_config(EMBEDDED_CONFIG);
    let mut monitors = config::build_monitors(&monitor_config);

    // Slot i reports through REPORT_CALLBACKS[i] and is named names[i]
    let mut names: tasks::MonitorNames = Vec::new();
    for (monitor, callback) in monitors.iter_mut().zip(REPORT_CALLBACKS) {
        monitor.register_callback(callback);
        let mut name = String::new();
        let _ = name.push_str(monitor.name());
        let _ = names.push(name);
    }

    // Setup I2C0 for the monitors
    // Pin assignment is board-specific (Pico: SDA=GPIO4, SCL=GPIO5)
    let frequency = monitor_config.bus_speed().unwrap_or(DEFAULT_I2C_SPEED);
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    info!("I2C0 initialized at {} Hz", frequency);

    spawner.spawn(tasks::report_task(names)).unwrap();
    spawner
        .spawn(tasks::power_monitor_task(EmbeddedHalBus::new(i2c), monitors))
        .unwrap();

    info!("All tasks spawned");
}
