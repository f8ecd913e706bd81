//! Configuration types
//!
//! Board-agnostic oven configuration and the parser for the embedded
//! `oven.toml` file.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
