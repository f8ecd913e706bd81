//! Thermocouple traits

use heapless::LinearMap;

/// Maximum number of thermocouple channels in one reading
pub const MAX_CHANNELS: usize = 4;

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Thermocouple disconnected
    OpenCircuit,
    /// Thermocouple shorted to ground
    ShortToGround,
    /// Thermocouple shorted to supply
    ShortToVcc,
    /// Bus transfer failed
    Bus,
}

/// One thermocouple conversion
///
/// Temperatures are fixed-point with 0.1°C resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermocoupleReading {
    /// Hot junction temperature
    pub external_x10: i16,
    /// Cold junction (converter die) temperature
    pub internal_x10: i16,
}

/// Channel name to reading map
///
/// Channels that failed to convert are absent.
pub type TemperatureReadings = LinearMap<&'static str, ThermocoupleReading, MAX_CHANNELS>;

/// Source of thermocouple readings living on the shared bus
///
/// Only call this while holding the bus lock.
pub trait TemperatureSource {
    /// Convert every channel and return the readings
    fn read_temperatures(&mut self) -> TemperatureReadings;
}
