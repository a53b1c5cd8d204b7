//! Simple TOML parser for monitor configuration
//!
//! This is a minimal line-oriented parser that handles only the subset
//! needed for monitor configuration. It does NOT support the full TOML spec
//! and needs no allocator.
//!
//! Supported features:
//! - `[ina226 name]`, `[ina226.name]` and bare `[ina226]` section headers
//! - Key = value pairs (integer, hex integer, float)
//! - Comments (# ...), including trailing comments
//!
//! Example:
//!
//! ```toml
//! [ina226 battery]
//! i2c_address = 0x40
//! i2c_speed = 100000
//! report_time = 30
//! current_lsb = 0.001
//! shunt_resistor = 0.1
//! ```

use heapless::String as HString;

use super::monitors::MonitorConfig;
use super::types::Ina226Settings;

/// Section type accepted by the parser
const SECTION_INA226: &str = "ina226";

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Two sections with the same monitor name
    DuplicateName,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::InvalidSection => write!(f, "invalid section header"),
            ParseError::InvalidValue => write!(f, "invalid value"),
            ParseError::TooManyItems => write!(f, "too many monitors"),
            ParseError::DuplicateName => write!(f, "duplicate monitor name"),
        }
    }
}

/// Parse TOML configuration into MonitorConfig
///
/// Keys outside a section and unknown keys are ignored.
pub fn parse_config(input: &str) -> Result<MonitorConfig, ParseError> {
    let mut config = MonitorConfig::new();
    let mut current: Option<Ina226Settings> = None;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            save_monitor(&mut config, &mut current)?;

            let name = parse_section_header(&line[1..line.len() - 1])?;
            let settings =
                Ina226Settings::named(name).map_err(|_| ParseError::InvalidSection)?;
            current = Some(settings);
            continue;
        }

        // Parse key = value
        if let Some((key, value)) = parse_key_value(line) {
            if let Some(settings) = current.as_mut() {
                apply_value(settings, key, value)?;
            }
        }
    }

    // Save final section
    save_monitor(&mut config, &mut current)?;

    Ok(config)
}

/// Parse section header like "ina226 battery", "ina226.battery" or "ina226"
///
/// Returns the monitor name.
fn parse_section_header(header: &str) -> Result<&str, ParseError> {
    let header = header.trim();

    let (section_type, name) = if let Some((section_type, name)) = header.split_once('.') {
        (section_type.trim(), Some(name.trim()))
    } else {
        let mut parts = header.split_whitespace();
        let section_type = parts.next().ok_or(ParseError::InvalidSection)?;
        let name = parts.next();
        if parts.next().is_some() {
            return Err(ParseError::InvalidSection);
        }
        (section_type, name)
    };

    if section_type != SECTION_INA226 {
        return Err(ParseError::InvalidSection);
    }

    match name {
        // Bare [ina226] takes the section type as its name
        None => Ok(SECTION_INA226),
        Some("") => Err(ParseError::InvalidSection),
        Some(name) if name.contains(|c: char| c.is_whitespace() || c == '.') => {
            Err(ParseError::InvalidSection)
        }
        Some(name) => Ok(name),
    }
}

/// Remove a trailing `#` comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse an integer value, decimal or 0x-prefixed hex, with optional `_`
/// digit separators
fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    let digits = strip_separators(parse_string(value))?;
    let digits = digits.as_str();

    let raw = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => digits.parse::<u32>(),
    }
    .map_err(|_| ParseError::InvalidValue)?;

    T::try_from(raw).map_err(|_| ParseError::InvalidValue)
}

/// Parse a float value
fn parse_float(value: &str) -> Result<f32, ParseError> {
    let digits = strip_separators(parse_string(value))?;
    digits
        .as_str()
        .parse::<f32>()
        .map_err(|_| ParseError::InvalidValue)
}

/// Copy a numeric literal without `_` separators
fn strip_separators(value: &str) -> Result<HString<24>, ParseError> {
    let mut out = HString::new();
    for c in value.chars().filter(|c| *c != '_') {
        out.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    Ok(out)
}

/// Apply a parsed value to the current monitor
fn apply_value(settings: &mut Ina226Settings, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "i2c_address" => settings.i2c_address = parse_int(value)?,
        "i2c_speed" => settings.i2c_speed = parse_int(value)?,
        "report_time" | "report_time_s" => settings.report_time_s = parse_int(value)?,
        "current_lsb" => settings.current_lsb = parse_float(value)?,
        "calibration" => settings.calibration = Some(parse_int(value)?),
        "shunt_resistor" | "shunt_resistor_ohms" => {
            settings.shunt_resistor_ohms = Some(parse_float(value)?)
        }
        _ => {} // Ignore unknown keys
    }

    Ok(())
}

/// Save the current monitor section to config
fn save_monitor(
    config: &mut MonitorConfig,
    current: &mut Option<Ina226Settings>,
) -> Result<(), ParseError> {
    if let Some(settings) = current.take() {
        if config.find_monitor(settings.name.as_str()).is_some() {
            return Err(ParseError::DuplicateName);
        }
        config
            .monitors
            .push(settings)
            .map_err(|_| ParseError::TooManyItems)?;
    }

    Ok(())
}
