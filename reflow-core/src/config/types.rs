//! Configuration type definitions
//!
//! Defaults match the stock oven: a 100 % top element, a bottom element
//! limited to 50 %, and the PCB thermocouple on channel `tc3`.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum thermocouple channel name length
pub const MAX_CHANNEL_NAME_LEN: usize = 8;

/// Maximum storage path length
pub const MAX_PATH_LEN: usize = 32;

/// Maximum profile file extension length (including the dot)
pub const MAX_EXTENSION_LEN: usize = 8;

/// Heater duty limits (percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaterLimits {
    /// Maximum duty of the top element
    pub top_max_duty: u8,
    /// Maximum duty of the bottom element
    pub bottom_max_duty: u8,
}

impl Default for HeaterLimits {
    fn default() -> Self {
        Self {
            top_max_duty: 100,
            bottom_max_duty: 50,
        }
    }
}

/// Overshoot prevention step sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OvershootConfig {
    /// Temperature distance between consecutive thresholds (°C)
    pub step_c: i16,
    /// Top duty reduction per step (percent)
    pub top_duty_step: u8,
    /// Bottom duty reduction per step (percent)
    pub bottom_duty_step: u8,
}

impl Default for OvershootConfig {
    fn default() -> Self {
        Self {
            step_c: 10,
            top_duty_step: 20,
            bottom_duty_step: 10,
        }
    }
}

/// Electronics cooling fan thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FanConfig {
    /// Duty above `low_temp_c`
    pub low_duty: u8,
    /// Duty above `high_temp_c`
    pub high_duty: u8,
    /// Low threshold (°C)
    pub low_temp_c: i16,
    /// High threshold (°C)
    pub high_temp_c: i16,
}

impl FanConfig {
    /// Fan duty for a PCB temperature in 0.1°C units
    pub fn duty_for(&self, temp_x10: i16) -> u8 {
        let temp_x10 = temp_x10 as i32;
        if temp_x10 > self.high_temp_c as i32 * 10 {
            self.high_duty
        } else if temp_x10 > self.low_temp_c as i32 * 10 {
            self.low_duty
        } else {
            0
        }
    }
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            low_duty: 10,
            high_duty: 20,
            low_temp_c: 30,
            high_temp_c: 100,
        }
    }
}

/// How the rotary encoder position reacts to its limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RotaryMode {
    /// No limits
    Unbounded,
    /// Wrap around from max to min and back
    Wrap,
    /// Clamp at min and max
    #[default]
    Bounded,
}

impl RotaryMode {
    /// Encode as a small integer for atomic storage
    pub const fn as_u8(self) -> u8 {
        match self {
            RotaryMode::Unbounded => 1,
            RotaryMode::Wrap => 2,
            RotaryMode::Bounded => 3,
        }
    }

    /// Decode from atomic storage, unknown values fall back to bounded
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => RotaryMode::Unbounded,
            2 => RotaryMode::Wrap,
            _ => RotaryMode::Bounded,
        }
    }
}

/// Rotary encoder defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotaryConfig {
    pub min: i32,
    pub max: i32,
    pub mode: RotaryMode,
}

impl Default for RotaryConfig {
    fn default() -> Self {
        Self {
            min: 0,
            max: 10,
            mode: RotaryMode::Bounded,
        }
    }
}

/// Profile storage naming
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StorageConfig {
    /// Extension of profile files, including the dot
    pub extension: String<MAX_EXTENSION_LEN>,
    /// Path of the default profile
    pub default_profile: String<MAX_PATH_LEN>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let mut extension = String::new();
        let _ = extension.push_str(".prf");
        let mut default_profile = String::new();
        let _ = default_profile.push_str("/def_profile.prf");
        Self {
            extension,
            default_profile,
        }
    }
}

/// Complete oven configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OvenConfig {
    pub heaters: HeaterLimits,
    pub overshoot: OvershootConfig,
    pub fan: FanConfig,
    /// Control tick period (ms)
    pub control_period_ms: u32,
    /// Status refresh period (ms)
    pub status_period_ms: u32,
    /// Menu polling period (ms)
    pub menu_period_ms: u32,
    /// Thermocouple channel measuring the PCB
    pub pcb_channel: String<MAX_CHANNEL_NAME_LEN>,
    pub rotary: RotaryConfig,
    pub storage: StorageConfig,
}

impl Default for OvenConfig {
    fn default() -> Self {
        let mut pcb_channel = String::new();
        let _ = pcb_channel.push_str("tc3");
        Self {
            heaters: HeaterLimits::default(),
            overshoot: OvershootConfig::default(),
            fan: FanConfig::default(),
            control_period_ms: 200,
            status_period_ms: 100,
            menu_period_ms: 40,
            pcb_channel,
            rotary: RotaryConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_thresholds() {
        let fan = FanConfig::default();
        assert_eq!(fan.duty_for(250), 0);
        assert_eq!(fan.duty_for(300), 0);
        assert_eq!(fan.duty_for(301), 10);
        assert_eq!(fan.duty_for(1000), 10);
        assert_eq!(fan.duty_for(1001), 20);
        assert_eq!(fan.duty_for(-400), 0);
    }

    #[test]
    fn test_rotary_mode_encoding() {
        for mode in [RotaryMode::Unbounded, RotaryMode::Wrap, RotaryMode::Bounded] {
            assert_eq!(RotaryMode::from_u8(mode.as_u8()), mode);
        }
        assert_eq!(RotaryMode::from_u8(0), RotaryMode::Bounded);
    }

    #[test]
    fn test_default_config() {
        let config = OvenConfig::default();
        assert_eq!(config.heaters.top_max_duty, 100);
        assert_eq!(config.heaters.bottom_max_duty, 50);
        assert_eq!(config.pcb_channel.as_str(), "tc3");
        assert_eq!(config.storage.extension.as_str(), ".prf");
        assert_eq!(config.control_period_ms, 200);
    }
}
