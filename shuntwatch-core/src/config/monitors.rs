//! Monitor configuration set
//!
//! Groups every configured power monitor on the board.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{ConfigError, Ina226Config, Ina226Settings};

/// Maximum monitors per config
pub const MAX_MONITORS: usize = 4;

/// Complete monitor configuration
///
/// This is the top-level configuration structure produced by the config
/// parser. Entries are raw settings; validate each with
/// [`Ina226Config::try_from`] before building a driver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// INA226 monitor settings
    pub monitors: Vec<Ina226Settings, MAX_MONITORS>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            monitors: Vec::new(),
        }
    }
}

impl MonitorConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a monitor by name
    pub fn find_monitor(&self, name: &str) -> Option<&Ina226Settings> {
        self.monitors.iter().find(|m| m.name.as_str() == name)
    }

    /// Bus clock shared by all monitors
    ///
    /// The slowest configured device sets the pace for the whole bus.
    /// Returns `None` when no monitors are configured.
    pub fn bus_speed(&self) -> Option<u32> {
        self.monitors.iter().map(|m| m.i2c_speed).min()
    }

    /// Validate a monitor's settings by position
    pub fn validated(&self, index: usize) -> Option<Result<Ina226Config, ConfigError>> {
        self.monitors
            .get(index)
            .map(|settings| Ina226Config::try_from(settings.clone()))
    }
}
