//! Board-agnostic core logic for the reflow oven firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Reflow profile model, file format and step queue
//! - Thermal control engine (bang-bang with overshoot prevention)
//! - Bus lock, fail-to-off duty guards and the shared status board
//! - Process-wide error mailbox
//! - Hardware abstraction traits (outputs, thermocouples, profile storage)
//! - Configuration type definitions and the `oven.toml` parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod error;
pub mod profile;
pub mod sync;
pub mod traits;

pub use error::{ErrorChannel, FaultKind, FormatErrorKind, ReflowError};
