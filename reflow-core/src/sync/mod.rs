//! Resource sharing between the control loop and the other periodic tasks
//!
//! - [`BusLock`]: the one mutex around the shared hardware bus
//! - [`DutyGuard`] / [`SwitchGuard`]: outputs that fail to off when dropped
//! - [`StatusBoard`]: tear-free snapshot of the control state for readers

pub mod bus;
pub mod guard;
pub mod status;

pub use bus::BusLock;
pub use guard::{DutyGuard, SwitchGuard};
pub use status::{StatusBoard, ThermalSnapshot};
