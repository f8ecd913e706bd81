//! Reflow profiles
//!
//! A profile is a name plus an ordered list of setpoint/soak/overshoot
//! triples. Before a run the entries are copied into a [`StepQueue`] which
//! the control engine consumes one entry at a time.

pub mod library;
pub mod model;
pub mod queue;

pub use library::{ProfileLibrary, MAX_PROFILE_FILES, PROFILE_BUF_LEN};
pub use model::{
    parse_profile, ProfileEntry, ReflowProfile, MAX_ENTRIES, MAX_NAME_LEN, MAX_OVERSHOOT_STEPS,
};
pub use queue::{build_step_queue, StepQueue};
