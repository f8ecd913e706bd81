//! MAX31855 thermocouple converters
//!
//! Several converters share one SPI bus, each with its own chip select.
//! A conversion is a plain 32-bit read:
//!
//! | Bits   | Content                                      |
//! |--------|----------------------------------------------|
//! | 31..18 | Thermocouple temperature, signed, 0.25 °C    |
//! | 16     | Fault flag                                   |
//! | 15..4  | Cold junction temperature, signed, 0.0625 °C |
//! | 2      | Short to VCC                                 |
//! | 1      | Short to GND                                 |
//! | 0      | Open circuit                                 |

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use heapless::Vec;
use reflow_core::traits::{
    SensorError, TemperatureReadings, TemperatureSource, ThermocoupleReading,
};

const FAULT: u32 = 1 << 16;
const SHORT_VCC: u32 = 1 << 2;
const SHORT_GND: u32 = 1 << 1;
const OPEN_CIRCUIT: u32 = 1 << 0;

/// Decoded conversion frame
pub type Max31855Frame = Result<ThermocoupleReading, SensorError>;

/// Decode one big-endian conversion frame
pub fn decode_frame(raw: [u8; 4]) -> Max31855Frame {
    let word = u32::from_be_bytes(raw);

    if word & FAULT != 0 {
        return Err(if word & OPEN_CIRCUIT != 0 {
            SensorError::OpenCircuit
        } else if word & SHORT_GND != 0 {
            SensorError::ShortToGround
        } else if word & SHORT_VCC != 0 {
            SensorError::ShortToVcc
        } else {
            SensorError::Bus
        });
    }

    // Arithmetic shifts keep the sign of both fields
    let external_quarters = (word as i32) >> 18;
    let internal_sixteenths = ((word << 16) as i32) >> 20;

    Ok(ThermocoupleReading {
        external_x10: (external_quarters * 5 / 2) as i16,
        internal_x10: (internal_sixteenths * 5 / 8) as i16,
    })
}

/// Errors configuring a [`ThermocoupleBank`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BankError {
    /// A channel with this name already exists
    DuplicateName,
    /// No room for another channel
    Full,
}

struct Channel<CS> {
    name: &'static str,
    cs: CS,
}

/// Named MAX31855 converters on one SPI bus
///
/// Put the bank inside the bus lock; [`TemperatureSource::read_temperatures`]
/// performs one transfer per channel.
pub struct ThermocoupleBank<SPI, CS, const N: usize> {
    spi: SPI,
    channels: Vec<Channel<CS>, N>,
}

impl<SPI: SpiBus, CS: OutputPin, const N: usize> ThermocoupleBank<SPI, CS, N> {
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            channels: Vec::new(),
        }
    }

    /// Register a converter under `name`
    ///
    /// The chip select is driven high (deselected) right away.
    pub fn add_channel(&mut self, name: &'static str, mut cs: CS) -> Result<(), BankError> {
        if self.channels.iter().any(|channel| channel.name == name) {
            return Err(BankError::DuplicateName);
        }
        let _ = cs.set_high();
        self.channels
            .push(Channel { name, cs })
            .map_err(|_| BankError::Full)
    }
}

fn transfer<SPI: SpiBus, CS: OutputPin>(spi: &mut SPI, cs: &mut CS) -> Result<[u8; 4], SensorError> {
    let mut raw = [0u8; 4];
    cs.set_low().map_err(|_| SensorError::Bus)?;
    let result = spi.read(&mut raw).and_then(|_| spi.flush());
    // Deselect even after a failed read
    let deselect = cs.set_high();
    result.map_err(|_| SensorError::Bus)?;
    deselect.map_err(|_| SensorError::Bus)?;
    Ok(raw)
}

impl<SPI: SpiBus, CS: OutputPin, const N: usize> TemperatureSource
    for ThermocoupleBank<SPI, CS, N>
{
    fn read_temperatures(&mut self) -> TemperatureReadings {
        let mut readings = TemperatureReadings::new();
        for channel in self.channels.iter_mut() {
            let frame = transfer(&mut self.spi, &mut channel.cs).and_then(decode_frame);
            if let Ok(reading) = frame {
                // The map holds as many entries as a bank may have channels
                let _ = readings.insert(channel.name, reading);
            }
        }
        readings
    }
}
