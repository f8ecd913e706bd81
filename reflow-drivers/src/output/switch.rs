//! GPIO switch output
//!
//! Drives a relay or the oven light through a push-pull pin. The pin can
//! be active-high (default) or active-low.

use embedded_hal::digital::OutputPin;
use reflow_core::traits::{OutputError, SwitchOutput};

pub struct PinSwitch<P> {
    pin: P,
    /// If true, switch ON = pin LOW
    inverted: bool,
    /// Current logical state
    on: bool,
}

impl<P: OutputPin> PinSwitch<P> {
    /// Wrap a pin, switching it off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut switch = Self {
            pin,
            inverted,
            on: true,
        };
        let _ = switch.set_on(false);
        switch
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Flip the switch
    pub fn toggle(&mut self) -> Result<(), OutputError> {
        self.set_on(!self.on)
    }
}

impl<P: OutputPin> SwitchOutput for PinSwitch<P> {
    fn set_on(&mut self, on: bool) -> Result<(), OutputError> {
        let result = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| OutputError::Hardware)?;
        self.on = on;
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct MockPin {
        high: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn test_active_high_switch() {
        let mut light = PinSwitch::new_active_high(MockPin { high: true });
        assert!(!light.is_on());
        assert!(!light.pin.high);

        light.set_on(true).unwrap();
        assert!(light.is_on());
        assert!(light.pin.high);
    }

    #[test]
    fn test_active_low_toggle() {
        let mut relay = PinSwitch::new_active_low(MockPin { high: false });
        assert!(!relay.is_on());
        assert!(relay.pin.high);

        relay.toggle().unwrap();
        assert!(relay.is_on());
        assert!(!relay.pin.high);

        relay.toggle().unwrap();
        assert!(relay.pin.high);
    }
}
