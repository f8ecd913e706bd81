//! User input decoding

pub mod button;
pub mod rotary;

pub use button::{PushButton, DEBOUNCE_MS};
pub use rotary::{RotaryDecoder, RotaryValue};
