//! Reflow thermal control
//!
//! The engine with its state and phase machine, the overshoot prevention
//! step computation and the request queue feeding the engine.

pub mod engine;
pub mod overshoot;
pub mod request;
pub mod state;

pub use engine::{Actuators, ThermalControlEngine, MAX_PENDING_EVENTS};
pub use overshoot::{overshoot_steps, OvershootStep, OvershootSteps};
pub use request::{ControlRequest, RequestQueue, MAX_PENDING_REQUESTS};
pub use state::{ControlEvent, ControlPhase, HeaterDuty, ThermalState};
