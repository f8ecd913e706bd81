//! Temperature sensor drivers

pub mod max31855;

pub use max31855::{decode_frame, BankError, Max31855Frame, ThermocoupleBank};
