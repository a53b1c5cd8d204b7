//! Configuration loading
//!
//! Parses the embedded monitors.toml with the no_std parser from
//! shuntwatch-core and turns every valid section into a driver.

use defmt::*;
use heapless::Vec;

use shuntwatch_core::config::{parse_config, Ina226Config, MonitorConfig, MAX_MONITORS};
use shuntwatch_drivers::power::Ina226;

/// Parse a configuration, falling back to no monitors on error
pub fn load_config(input: &str) -> MonitorConfig {
    match parse_config(input) {
        Ok(config) => {
            info!("Config parsed: {} monitor(s)", config.monitors.len());
            config
        }
        Err(e) => {
            error!("Config parse failed: {}", e);
            MonitorConfig::new()
        }
    }
}

/// Build a driver for every section that passes validation
///
/// Invalid sections are skipped with a warning.
pub fn build_monitors(config: &MonitorConfig) -> Vec<Ina226, MAX_MONITORS> {
    let mut monitors = Vec::new();

    for settings in config.monitors.iter() {
        match Ina226Config::try_from(settings.clone()) {
            Ok(validated) => {
                info!(
                    "[ina226 {}] addr={=u8:#x} report_time={}s calibration={}",
                    validated.name(),
                    validated.i2c_address(),
                    validated.report_time_s(),
                    validated.calibration()
                );
                // Capacity matches MonitorConfig, so this never overflows
                let _ = monitors.push(Ina226::new(validated));
            }
            Err(e) => {
                warn!("[ina226 {}] skipped: {}", settings.name.as_str(), e);
            }
        }
    }

    monitors
}
