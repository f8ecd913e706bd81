//! Overshoot prevention steps
//!
//! While climbing towards a setpoint the heaters are tapered in steps: each
//! step is a temperature threshold below the setpoint plus reduced duty caps
//! for both heaters. The last step sits one `step_c` below the setpoint, the
//! first one `count` steps below it.

use heapless::Vec;

use crate::config::{HeaterLimits, OvershootConfig};
use crate::profile::MAX_OVERSHOOT_STEPS;

/// One precomputed taper step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OvershootStep {
    /// Step fires once the PCB temperature rises above this (°C)
    pub threshold_c: i32,
    /// Top heater duty from here on (percent)
    pub top_duty_cap: u8,
    /// Bottom heater duty from here on (percent)
    pub bottom_duty_cap: u8,
}

/// Steps for one setpoint, in firing order
pub type OvershootSteps = Vec<OvershootStep, { MAX_OVERSHOOT_STEPS as usize }>;

/// Compute the taper steps for `setpoint_c` with `count` steps
///
/// Step `i` (1-based) has threshold `setpoint - step_c * (count - i + 1)`
/// and caps `max - duty_step * i`, floored at 0. Counts above
/// [`MAX_OVERSHOOT_STEPS`] are truncated.
pub fn overshoot_steps(
    setpoint_c: u16,
    count: u8,
    limits: &HeaterLimits,
    config: &OvershootConfig,
) -> OvershootSteps {
    let count = count.min(MAX_OVERSHOOT_STEPS) as i32;
    let mut steps = OvershootSteps::new();

    for i in 1..=count {
        let threshold_c = setpoint_c as i32 - config.step_c as i32 * (count - i + 1);
        let top = limits.top_max_duty as i32 - config.top_duty_step as i32 * i;
        let bottom = limits.bottom_max_duty as i32 - config.bottom_duty_step as i32 * i;

        // count is bounded by the capacity
        let _ = steps.push(OvershootStep {
            threshold_c,
            top_duty_cap: top.max(0) as u8,
            bottom_duty_cap: bottom.max(0) as u8,
        });
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(setpoint_c: u16, count: u8) -> OvershootSteps {
        overshoot_steps(
            setpoint_c,
            count,
            &HeaterLimits::default(),
            &OvershootConfig::default(),
        )
    }

    #[test]
    fn test_three_steps() {
        let s = steps(160, 3);
        assert_eq!(
            s.as_slice(),
            &[
                OvershootStep {
                    threshold_c: 130,
                    top_duty_cap: 80,
                    bottom_duty_cap: 40
                },
                OvershootStep {
                    threshold_c: 140,
                    top_duty_cap: 60,
                    bottom_duty_cap: 30
                },
                OvershootStep {
                    threshold_c: 150,
                    top_duty_cap: 40,
                    bottom_duty_cap: 20
                },
            ]
        );
    }

    #[test]
    fn test_zero_steps() {
        assert!(steps(220, 0).is_empty());
    }

    #[test]
    fn test_caps_floor_at_zero() {
        let s = steps(250, 10);
        assert_eq!(s.len(), 10);
        assert_eq!(s[4].top_duty_cap, 0);
        assert_eq!(s[4].bottom_duty_cap, 0);
        assert_eq!(s[9].top_duty_cap, 0);
        assert_eq!(s[9].threshold_c, 240);
    }

    #[test]
    fn test_count_truncated() {
        assert_eq!(steps(200, 40).len(), MAX_OVERSHOOT_STEPS as usize);
    }
}
