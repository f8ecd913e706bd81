//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in reflow-core for the oven hardware:
//!
//! - Quadrature rotary encoder and push button (interrupt-safe)
//! - PWM heater and fan outputs, GPIO light switch, piezo buzzer
//! - MAX31855 thermocouple converters on a shared SPI bus

#![no_std]
#![deny(unsafe_code)]

pub mod input;
pub mod output;
pub mod sensor;
