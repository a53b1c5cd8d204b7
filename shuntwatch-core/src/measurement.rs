//! Power measurement snapshot
//!
//! One [`Measurement`] holds the four values produced by a sampling cycle.
//! The values are always replaced together.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status key for the shunt voltage field
pub const KEY_SHUNT_VOLTAGE: &str = "shunt_voltage";
/// Status key for the bus voltage field
pub const KEY_BUS_VOLTAGE: &str = "bus_voltage";
/// Status key for the current field
pub const KEY_CURRENT: &str = "current";
/// Status key for the power field
pub const KEY_POWER: &str = "power";

/// Latest electrical measurement from a power monitor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// Voltage across the shunt resistor (V, signed)
    pub shunt_voltage: f32,
    /// Bus voltage to ground (V)
    pub bus_voltage: f32,
    /// Current through the shunt (A, signed)
    pub current: f32,
    /// Power delivered to the load (W)
    pub power: f32,
}

impl Measurement {
    /// All-zero measurement, used at startup and after a failed sample
    pub const ZERO: Self = Self {
        shunt_voltage: 0.0,
        bus_voltage: 0.0,
        current: 0.0,
        power: 0.0,
    };

    /// Status mapping reported to consumers
    ///
    /// Always exactly four entries, in register read order.
    pub fn status(&self) -> [(&'static str, f32); 4] {
        [
            (KEY_SHUNT_VOLTAGE, self.shunt_voltage),
            (KEY_BUS_VOLTAGE, self.bus_voltage),
            (KEY_CURRENT, self.current),
            (KEY_POWER, self.power),
        ]
    }

    /// Look up a single status value by key
    pub fn get(&self, key: &str) -> Option<f32> {
        self.status()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Check if every field is exactly zero
    pub fn is_zero(&self) -> bool {
        self.status().iter().all(|(_, v)| *v == 0.0)
    }
}
