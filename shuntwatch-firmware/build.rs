//! Build script for shuntwatch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates monitors.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Must match `shuntwatch_core::config::MAX_MONITORS`
const MAX_MONITORS: usize = 4;

/// Must match `shuntwatch_core::config::MIN_REPORT_TIME_S`
const MIN_REPORT_TIME_S: i64 = 5;

/// Must match `shuntwatch_core::config::MAX_NAME_LEN`
const MAX_NAME_LEN: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate monitors.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=monitors.toml");

    let config_path = Path::new("monitors.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: monitors.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds monitors.toml at build time.                ║\n\
            ║  Please create one in the shuntwatch-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read monitors.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in monitors.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = validate_monitors(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid monitor configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=monitors.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate every [ina226.*] section
fn validate_monitors(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for key in root.keys() {
        if key != "ina226" {
            errors.push(format!("Unknown section [{}]", key));
        }
    }

    let monitors = match root.get("ina226") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[ina226] must be a table".to_string());
            return errors;
        }
        None => {
            println!("cargo:warning=monitors.toml has no [ina226.*] sections");
            return errors;
        }
    };

    // A bare [ina226] section holds keys directly instead of named tables
    let sections: Vec<(String, &toml::Table)> = if monitors.values().all(|v| v.is_table()) {
        monitors
            .iter()
            .filter_map(|(name, v)| v.as_table().map(|t| (name.clone(), t)))
            .collect()
    } else if monitors.values().any(|v| v.is_table()) {
        errors.push("[ina226] mixes monitor keys and named sections".to_string());
        return errors;
    } else {
        vec![("ina226".to_string(), monitors)]
    };

    if sections.len() > MAX_MONITORS {
        errors.push(format!(
            "{} monitors configured, at most {} supported",
            sections.len(),
            MAX_MONITORS
        ));
    }

    for (name, section) in &sections {
        if name.len() > MAX_NAME_LEN {
            errors.push(format!("[ina226.{}] name longer than {}", name, MAX_NAME_LEN));
        }
        validate_monitor(name, section, &mut errors);
    }

    errors
}

/// Validate a single monitor section
fn validate_monitor(name: &str, section: &toml::Table, errors: &mut Vec<String>) {
    if let Some(value) = section.get("i2c_address") {
        match value.as_integer() {
            Some(addr) if (0..=0x7F).contains(&addr) => {}
            _ => errors.push(format!("[ina226.{}] i2c_address must be 0x00-0x7F", name)),
        }
    }

    if let Some(value) = section.get("i2c_speed") {
        match value.as_integer() {
            Some(speed) if speed > 0 && speed <= u32::MAX as i64 => {}
            _ => errors.push(format!("[ina226.{}] i2c_speed must be a positive integer", name)),
        }
    }

    if let Some(value) = section.get("report_time") {
        match value.as_integer() {
            Some(t) if t >= MIN_REPORT_TIME_S && t <= u32::MAX as i64 => {}
            _ => errors.push(format!(
                "[ina226.{}] report_time must be >= {}s",
                name, MIN_REPORT_TIME_S
            )),
        }
    }

    if let Some(value) = section.get("current_lsb") {
        match as_number(value) {
            Some(lsb) if lsb > 0.0 => {}
            _ => errors.push(format!("[ina226.{}] current_lsb must be above 0", name)),
        }
    }

    if let Some(value) = section.get("calibration") {
        match value.as_integer() {
            Some(cal) if (0..=0x7FFF).contains(&cal) => {}
            _ => errors.push(format!("[ina226.{}] calibration must be 0-0x7FFF", name)),
        }
    }

    if let Some(value) = section.get("shunt_resistor") {
        match as_number(value) {
            Some(ohms) if ohms > 0.0 => {}
            _ => errors.push(format!("[ina226.{}] shunt_resistor must be above 0", name)),
        }
    }
}

/// Accept both float and integer literals
fn as_number(value: &toml::Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}
