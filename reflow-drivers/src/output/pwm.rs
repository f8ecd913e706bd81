//! PWM duty output
//!
//! Wraps any embedded-hal PWM channel as a [`DutyOutput`]. Used for both
//! heaters and the fan.

use embedded_hal::pwm::SetDutyCycle;
use reflow_core::traits::{DutyOutput, OutputError};

/// PWM channel driven in whole percent
pub struct PwmOutput<P> {
    channel: P,
    /// Duty last applied successfully
    duty: u8,
}

impl<P: SetDutyCycle> PwmOutput<P> {
    /// Wrap a channel and force it off
    pub fn new(channel: P) -> Self {
        let mut output = Self { channel, duty: 0 };
        // A channel that rejects 0 % is reported on first use
        let _ = output.channel.set_duty_cycle_fully_off();
        output
    }
}

impl<P: SetDutyCycle> DutyOutput for PwmOutput<P> {
    fn set_duty(&mut self, percent: u8) -> Result<(), OutputError> {
        if percent > 100 {
            return Err(OutputError::InvalidDuty);
        }
        self.channel
            .set_duty_cycle_percent(percent)
            .map_err(|_| OutputError::Hardware)?;
        self.duty = percent;
        Ok(())
    }

    fn duty(&self) -> u8 {
        self.duty
    }
}
