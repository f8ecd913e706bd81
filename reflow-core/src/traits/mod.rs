//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and
//! hardware-specific implementations.

pub mod outputs;
pub mod sensor;
pub mod storage;

pub use outputs::{AudibleSignal, DutyOutput, OutputError, SwitchOutput};
pub use sensor::{
    SensorError, TemperatureReadings, TemperatureSource, ThermocoupleReading, MAX_CHANNELS,
};
pub use storage::{ProfileStorage, StorageError};
