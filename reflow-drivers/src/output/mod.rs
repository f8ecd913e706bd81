//! Actuator drivers

pub mod buzzer;
pub mod pwm;
pub mod switch;

pub use buzzer::{csharp_hz, Buzzer, Note, Tune, FAULT_PATTERN, JINGLE};
pub use pwm::PwmOutput;
pub use switch::PinSwitch;
