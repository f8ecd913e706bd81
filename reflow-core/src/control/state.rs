//! Control engine state and phase machine
//!
//! [`ThermalState`] holds the working variables of one reflow run.
//! [`ControlPhase`] is the coarse phase shown to the user; it is a pure
//! function of the [`ControlEvent`]s the engine emits.

use super::overshoot::{OvershootStep, OvershootSteps};
use crate::error::ReflowError;

/// Coarse engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlPhase {
    /// Nothing has run since power-on
    #[default]
    Idle,
    /// Climbing towards the current setpoint
    Heating,
    /// Holding at the current setpoint
    Soaking,
    /// Profile completed
    Done,
    /// Run cancelled or aborted by a fault; heaters are off
    Shutdown,
}

/// Things that happened during a control tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// A run was accepted
    ReflowStarted,
    /// Next profile stage loaded
    SetpointChanged {
        setpoint_c: u16,
        soak_s: u16,
        overshoot_steps: u8,
    },
    /// Heater caps reduced by an overshoot step (`index` is 1-based)
    OvershootStep {
        index: u8,
        top_duty: u8,
        bottom_duty: u8,
    },
    /// Setpoint reached, soak timer started
    SoakingStarted { setpoint_c: u16 },
    /// Soak time elapsed
    SoakingEnded,
    /// Profile completed (soft shutdown)
    Finished,
    /// Run cancelled (hard shutdown without error)
    Interrupted,
    /// Run aborted by an error
    Aborted(ReflowError),
}

impl ControlEvent {
    /// Prompt shown to the user after a shutdown
    pub fn shutdown_message(&self) -> Option<&'static str> {
        match self {
            ControlEvent::Finished => Some("Reflow process finished. Please, open oven door!"),
            ControlEvent::Interrupted => {
                Some("Reflow process has been interrupted. Please, open oven door!")
            }
            _ => None,
        }
    }
}

impl ControlPhase {
    /// Process an event and return the next phase
    pub fn transition(self, event: ControlEvent) -> Self {
        use ControlEvent::*;
        use ControlPhase::*;

        match (self, event) {
            (Idle | Done | Shutdown, ReflowStarted) => Heating,

            (Heating, SoakingStarted { .. }) => Soaking,
            (Soaking, SoakingEnded) => Heating,

            // Terminal outcomes are reachable from every phase
            (_, Finished) => Done,
            (_, Interrupted) => Shutdown,
            (_, Aborted(_)) => Shutdown,

            (phase, _) => phase,
        }
    }
}

/// Heater duty pair (percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterDuty {
    pub top: u8,
    pub bottom: u8,
}

/// Working variables of a reflow run
///
/// Owned by the engine and only mutated from its control tick, `start` and
/// `cancel`. Timestamps are milliseconds from a free-running wrapping clock.
#[derive(Debug, Clone, Default)]
pub struct ThermalState {
    pub reflowing: bool,
    /// °C, 0 before the first stage is loaded
    pub current_setpoint: u16,
    pub last_setpoint: u16,
    /// Seconds
    pub current_soaktime: u16,
    pub soaking_started_at: Option<u32>,
    /// Milliseconds
    pub soaking_elapsed: u32,
    /// Overshoot step count of the current stage
    pub overshoot_prevention: u8,
    /// Steps already applied for the current stage
    pub overshoot_step_index: u8,
    pub overshoot_steps: OvershootSteps,
    pub current_overshoot_step: Option<OvershootStep>,
    pub heating_top: bool,
    pub heating_bottom: bool,
    /// Readback at the start of the last tick
    pub heater_duty: HeaterDuty,
}

impl ThermalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heater or soak flags still set
    ///
    /// Happens when a run is stopped from outside the control tick.
    pub fn has_residual(&self) -> bool {
        self.heating_top || self.heating_bottom || self.soaking_started_at.is_some()
    }
}
