//! Simple TOML parser for oven configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `oven.toml`. It does NOT support full TOML and never allocates.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys

use heapless::String;

use super::types::{OvenConfig, RotaryMode};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String does not fit its fixed capacity
    TooLong,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Heater,
    Overshoot,
    Fan,
    Control,
    Rotary,
    Storage,
}

/// Parse TOML configuration into an [`OvenConfig`]
///
/// Keys missing from the input keep their default value. Unknown keys are
/// ignored so newer config files still load on older firmware.
pub fn parse_config(input: &str) -> Result<OvenConfig, ParseError> {
    let mut config = OvenConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    if config.rotary.min > config.rotary.max {
        return Err(ParseError::InvalidValue);
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "heater" => Ok(Section::Heater),
        "overshoot" => Ok(Section::Overshoot),
        "fan" => Ok(Section::Fan),
        "control" => Ok(Section::Control),
        "rotary" => Ok(Section::Rotary),
        "storage" => Ok(Section::Storage),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Duty values are percentages
fn parse_duty(value: &str) -> Result<u8, ParseError> {
    let duty: u8 = parse_int(value)?;
    if duty > 100 {
        return Err(ParseError::InvalidValue);
    }
    Ok(duty)
}

/// Parse a period in milliseconds, zero is rejected
fn parse_period(value: &str) -> Result<u32, ParseError> {
    match parse_int(value)? {
        0 => Err(ParseError::InvalidValue),
        ms => Ok(ms),
    }
}

fn parse_rotary_mode(value: &str) -> Result<RotaryMode, ParseError> {
    match parse_string(value) {
        "unbounded" => Ok(RotaryMode::Unbounded),
        "wrap" => Ok(RotaryMode::Wrap),
        "bounded" => Ok(RotaryMode::Bounded),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_fixed_string<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    let mut out = String::new();
    out.push_str(parse_string(value))
        .map_err(|_| ParseError::TooLong)?;
    Ok(out)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut OvenConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Heater, "top_max_duty") => config.heaters.top_max_duty = parse_duty(value)?,
        (Section::Heater, "bottom_max_duty") => {
            config.heaters.bottom_max_duty = parse_duty(value)?
        }

        (Section::Overshoot, "step_c") => config.overshoot.step_c = parse_int(value)?,
        (Section::Overshoot, "top_duty_step") => {
            config.overshoot.top_duty_step = parse_duty(value)?
        }
        (Section::Overshoot, "bottom_duty_step") => {
            config.overshoot.bottom_duty_step = parse_duty(value)?
        }

        (Section::Fan, "low_duty") => config.fan.low_duty = parse_duty(value)?,
        (Section::Fan, "high_duty") => config.fan.high_duty = parse_duty(value)?,
        (Section::Fan, "low_temp_c") => config.fan.low_temp_c = parse_int(value)?,
        (Section::Fan, "high_temp_c") => config.fan.high_temp_c = parse_int(value)?,

        (Section::Control, "period_ms") => config.control_period_ms = parse_period(value)?,
        (Section::Control, "status_period_ms") => {
            config.status_period_ms = parse_period(value)?
        }
        (Section::Control, "menu_period_ms") => config.menu_period_ms = parse_period(value)?,
        (Section::Control, "pcb_channel") => config.pcb_channel = parse_fixed_string(value)?,

        (Section::Rotary, "min") => config.rotary.min = parse_int(value)?,
        (Section::Rotary, "max") => config.rotary.max = parse_int(value)?,
        (Section::Rotary, "mode") => config.rotary.mode = parse_rotary_mode(value)?,

        (Section::Storage, "extension") => config.storage.extension = parse_fixed_string(value)?,
        (Section::Storage, "default_profile") => {
            config.storage.default_profile = parse_fixed_string(value)?
        }

        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("a = 1"), Some(("a", "1")));
        assert_eq!(parse_key_value("a = 1 # note"), Some(("a", "1")));
        assert_eq!(
            parse_key_value("name = \"tc#3\""),
            Some(("name", "\"tc#3\""))
        );
        assert_eq!(parse_key_value("a ="), None);
        assert_eq!(parse_key_value("no equals"), None);
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("fan").unwrap(), Section::Fan);
        assert_eq!(parse_section_header(" rotary ").unwrap(), Section::Rotary);
        assert_eq!(
            parse_section_header("stepper").unwrap_err(),
            ParseError::InvalidSection
        );
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, OvenConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Stock oven
[heater]
top_max_duty = 90
bottom_max_duty = 40

[overshoot]
step_c = 8

[fan]
low_duty = 15
high_temp_c = 120

[control]
period_ms = 250
pcb_channel = "tc1"

[rotary]
min = -5
max = 5
mode = "wrap"

[storage]
extension = ".txt"
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.heaters.top_max_duty, 90);
        assert_eq!(config.heaters.bottom_max_duty, 40);
        assert_eq!(config.overshoot.step_c, 8);
        assert_eq!(config.overshoot.top_duty_step, 20);
        assert_eq!(config.fan.low_duty, 15);
        assert_eq!(config.fan.high_temp_c, 120);
        assert_eq!(config.control_period_ms, 250);
        assert_eq!(config.pcb_channel.as_str(), "tc1");
        assert_eq!(config.rotary.min, -5);
        assert_eq!(config.rotary.mode, RotaryMode::Wrap);
        assert_eq!(config.storage.extension.as_str(), ".txt");
        assert_eq!(config.storage.default_profile.as_str(), "/def_profile.prf");
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert_eq!(
            parse_config("[heater]\ntop_max_duty = 120").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("[control]\nperiod_ms = 0").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("[control]\npcb_channel = \"thermocouple\"").unwrap_err(),
            ParseError::TooLong
        );
        assert_eq!(
            parse_config("[rotary]\nmin = 4\nmax = 2").unwrap_err(),
            ParseError::InvalidValue
        );
    }
}
