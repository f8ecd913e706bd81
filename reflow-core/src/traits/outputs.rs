//! Actuator traits
//!
//! Small capability interfaces implemented per physical device: heaters and
//! the fan are [`DutyOutput`]s, the oven light is a [`SwitchOutput`].

/// Errors reported by an output driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Duty outside 0..=100
    InvalidDuty,
    /// Underlying peripheral rejected the update
    Hardware,
}

/// PWM-driven output with a duty cycle in percent
///
/// Implementations are single-owner and must not block.
pub trait DutyOutput {
    /// Set the duty cycle (0..=100 %)
    fn set_duty(&mut self, percent: u8) -> Result<(), OutputError>;

    /// Read back the duty cycle last applied (percent)
    fn duty(&self) -> u8;

    /// Force the output off
    fn off(&mut self) -> Result<(), OutputError> {
        self.set_duty(0)
    }
}

impl<D: DutyOutput + ?Sized> DutyOutput for &mut D {
    fn set_duty(&mut self, percent: u8) -> Result<(), OutputError> {
        (**self).set_duty(percent)
    }

    fn duty(&self) -> u8 {
        (**self).duty()
    }
}

/// On/off output such as a relay or the oven light
pub trait SwitchOutput {
    /// Turn the output on or off
    fn set_on(&mut self, on: bool) -> Result<(), OutputError>;

    /// Check if the output is currently on
    fn is_on(&self) -> bool;
}

impl<S: SwitchOutput + ?Sized> SwitchOutput for &mut S {
    fn set_on(&mut self, on: bool) -> Result<(), OutputError> {
        (**self).set_on(on)
    }

    fn is_on(&self) -> bool {
        (**self).is_on()
    }
}

/// Fire-and-forget audible signal
///
/// Implementations only queue the sound; playback happens elsewhere.
pub trait AudibleSignal {
    /// Completion or cancellation jingle
    fn play_completion_jingle(&mut self);

    /// Alarm pattern after a control loop fault
    fn play_fault_pattern(&mut self);
}
