//! Configuration type definitions
//!
//! [`Ina226Settings`] is the raw per-device configuration as loaded from
//! the config file. [`Ina226Config`] is the validated, immutable form the
//! driver is built from.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum monitor name length
pub const MAX_NAME_LEN: usize = 16;

/// Default INA226 I2C address (A0 = A1 = GND)
pub const DEFAULT_I2C_ADDRESS: u8 = 0x40;

/// Default I2C clock speed in Hz
pub const DEFAULT_I2C_SPEED: u32 = 100_000;

/// Default interval between samples in seconds
pub const DEFAULT_REPORT_TIME_S: u32 = 30;

/// Minimum interval between samples in seconds
pub const MIN_REPORT_TIME_S: u32 = 5;

/// Default current register scale (1 mA per bit)
pub const DEFAULT_CURRENT_LSB: f32 = 0.001;

/// Power register LSB is fixed at 25 times the current LSB
pub const POWER_LSB_FACTOR: f32 = 25.0;

/// Internal fixed scaling value used by the INA226 calibration equation
pub const CALIBRATION_SCALE: f32 = 0.00512;

/// Highest calibration register value (bit 15 is reserved)
pub const MAX_CALIBRATION: u16 = 0x7FFF;

/// Raw INA226 monitor settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ina226Settings {
    /// Monitor name (e.g., "battery", "psu")
    pub name: String<MAX_NAME_LEN>,
    /// 7-bit I2C address
    pub i2c_address: u8,
    /// I2C clock speed in Hz
    pub i2c_speed: u32,
    /// Interval between samples in seconds
    pub report_time_s: u32,
    /// Current register scale in amperes per bit
    pub current_lsb: f32,
    /// Raw calibration register value, written as-is when set
    pub calibration: Option<u16>,
    /// Shunt resistor in ohms, used to derive calibration when
    /// `calibration` is not set
    pub shunt_resistor_ohms: Option<f32>,
}

impl Default for Ina226Settings {
    fn default() -> Self {
        Self {
            name: String::new(),
            i2c_address: DEFAULT_I2C_ADDRESS,
            i2c_speed: DEFAULT_I2C_SPEED,
            report_time_s: DEFAULT_REPORT_TIME_S,
            current_lsb: DEFAULT_CURRENT_LSB,
            calibration: None,
            shunt_resistor_ohms: None,
        }
    }
}

impl Ina226Settings {
    /// Create default settings for a named monitor
    pub fn named(name: &str) -> Result<Self, ConfigError> {
        let name = String::try_from(name).map_err(|_| ConfigError::NameTooLong)?;
        Ok(Self {
            name,
            ..Self::default()
        })
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Report interval below [`MIN_REPORT_TIME_S`]
    ReportTimeTooShort { report_time_s: u32 },
    /// Current LSB is zero, negative or not finite
    InvalidCurrentLsb,
    /// Address does not fit in 7 bits
    InvalidAddress { address: u8 },
    /// Shunt resistor is zero, negative or not finite
    InvalidShuntResistor,
    /// Derived calibration value does not fit the register
    CalibrationOutOfRange,
    /// Monitor name exceeds [`MAX_NAME_LEN`]
    NameTooLong,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ReportTimeTooShort { report_time_s } => write!(
                f,
                "report_time {}s is below the minimum of {}s",
                report_time_s, MIN_REPORT_TIME_S
            ),
            ConfigError::InvalidCurrentLsb => write!(f, "current_lsb must be above 0"),
            ConfigError::InvalidAddress { address } => {
                write!(f, "i2c_address {:#04x} is not a 7-bit address", address)
            }
            ConfigError::InvalidShuntResistor => write!(f, "shunt_resistor must be above 0"),
            ConfigError::CalibrationOutOfRange => {
                write!(f, "calibration does not fit in 1..={}", MAX_CALIBRATION)
            }
            ConfigError::NameTooLong => write!(f, "name longer than {} bytes", MAX_NAME_LEN),
        }
    }
}

/// Validated INA226 device configuration
///
/// Built once from [`Ina226Settings`] and never modified. The power LSB is
/// not stored; it is always derived from the current LSB.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ina226Config {
    name: String<MAX_NAME_LEN>,
    i2c_address: u8,
    i2c_speed: u32,
    report_time_s: u32,
    current_lsb: f32,
    calibration: u16,
}

impl Ina226Config {
    /// Monitor name
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// 7-bit I2C address
    pub fn i2c_address(&self) -> u8 {
        self.i2c_address
    }

    /// I2C clock speed in Hz
    pub fn i2c_speed(&self) -> u32 {
        self.i2c_speed
    }

    /// Interval between samples in seconds
    pub fn report_time_s(&self) -> u32 {
        self.report_time_s
    }

    /// Interval between samples in milliseconds
    pub fn report_interval_ms(&self) -> u64 {
        self.report_time_s as u64 * 1000
    }

    /// Current register scale in amperes per bit
    pub fn current_lsb(&self) -> f32 {
        self.current_lsb
    }

    /// Power register scale in watts per bit
    pub fn power_lsb(&self) -> f32 {
        self.current_lsb * POWER_LSB_FACTOR
    }

    /// Value written to the calibration register
    pub fn calibration(&self) -> u16 {
        self.calibration
    }
}

impl Default for Ina226Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            i2c_address: DEFAULT_I2C_ADDRESS,
            i2c_speed: DEFAULT_I2C_SPEED,
            report_time_s: DEFAULT_REPORT_TIME_S,
            current_lsb: DEFAULT_CURRENT_LSB,
            calibration: 0,
        }
    }
}

impl TryFrom<Ina226Settings> for Ina226Config {
    type Error = ConfigError;

    fn try_from(settings: Ina226Settings) -> Result<Self, Self::Error> {
        if settings.i2c_address > 0x7F {
            return Err(ConfigError::InvalidAddress {
                address: settings.i2c_address,
            });
        }

        if settings.report_time_s < MIN_REPORT_TIME_S {
            return Err(ConfigError::ReportTimeTooShort {
                report_time_s: settings.report_time_s,
            });
        }

        let current_lsb = settings.current_lsb;
        if !current_lsb.is_finite() || current_lsb <= 0.0 {
            return Err(ConfigError::InvalidCurrentLsb);
        }

        let calibration = match (settings.calibration, settings.shunt_resistor_ohms) {
            (Some(raw), _) => raw,
            (None, Some(shunt_ohms)) => calibration_for(current_lsb, shunt_ohms)?,
            (None, None) => 0,
        };

        Ok(Self {
            name: settings.name,
            i2c_address: settings.i2c_address,
            i2c_speed: settings.i2c_speed,
            report_time_s: settings.report_time_s,
            current_lsb,
            calibration,
        })
    }
}

/// Calculate the calibration register value for a shunt resistor
///
/// CAL = 0.00512 / (current_lsb * R_shunt), truncated.
pub fn calibration_for(current_lsb: f32, shunt_ohms: f32) -> Result<u16, ConfigError> {
    if !shunt_ohms.is_finite() || shunt_ohms <= 0.0 {
        return Err(ConfigError::InvalidShuntResistor);
    }

    let cal = CALIBRATION_SCALE / (current_lsb * shunt_ohms);
    if !cal.is_finite() || cal < 1.0 || cal > MAX_CALIBRATION as f32 {
        return Err(ConfigError::CalibrationOutOfRange);
    }

    Ok(cal as u16)
}
