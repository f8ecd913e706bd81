//! Push button with deferred debounce
//!
//! The edge handler only marks a candidate press. The consumer waits
//! [`DEBOUNCE_MS`] and calls [`PushButton::confirm`] with the pin level it
//! then sees, so no delay ever runs in interrupt context.

use portable_atomic::{AtomicBool, Ordering};

/// Time between the falling edge and the confirming sample
pub const DEBOUNCE_MS: u64 = 5;

/// Press flag shared between the edge handler and a reader
pub struct PushButton {
    candidate: AtomicBool,
    pressed: AtomicBool,
}

impl PushButton {
    pub const fn new() -> Self {
        Self {
            candidate: AtomicBool::new(false),
            pressed: AtomicBool::new(false),
        }
    }

    /// Record a falling edge on the (active-low) button pin
    pub fn on_falling_edge(&self) {
        self.candidate.store(true, Ordering::Release);
    }

    /// Confirm a pending edge after the debounce delay
    ///
    /// `still_low` is the pin level sampled after [`DEBOUNCE_MS`]. Returns
    /// whether a press was registered.
    pub fn confirm(&self, still_low: bool) -> bool {
        let pending = self.candidate.swap(false, Ordering::AcqRel);
        if pending && still_low {
            self.pressed.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Read and clear the press flag
    pub fn take_pressed(&self) -> bool {
        self.pressed.swap(false, Ordering::AcqRel)
    }
}

impl Default for PushButton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_press() {
        let button = PushButton::new();
        button.on_falling_edge();
        assert!(button.confirm(true));
        assert!(button.take_pressed());
        assert!(!button.take_pressed());
    }

    #[test]
    fn test_glitch_rejected() {
        let button = PushButton::new();
        button.on_falling_edge();
        assert!(!button.confirm(false));
        assert!(!button.take_pressed());
    }

    #[test]
    fn test_confirm_without_edge() {
        let button = PushButton::new();
        assert!(!button.confirm(true));
        assert!(!button.take_pressed());
    }
}
