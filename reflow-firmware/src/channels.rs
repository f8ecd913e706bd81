//! Inter-task communication
//!
//! Statics shared between the embassy tasks and the encoder edge handlers.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use reflow_core::config::{RotaryConfig, RotaryMode};
use reflow_core::control::RequestQueue;
use reflow_core::sync::StatusBoard;
use reflow_core::ErrorChannel;
use reflow_drivers::input::RotaryDecoder;
use reflow_drivers::output::Tune;

/// Menu to control task requests, drained at the start of every tick
pub static CONTROL_REQUEST: RequestQueue<CriticalSectionRawMutex> = RequestQueue::new();

/// Tunes for the buzzer task
pub static BUZZER: Signal<CriticalSectionRawMutex, Tune> = Signal::new();

/// Last error for the status display
pub static ERRORS: ErrorChannel<CriticalSectionRawMutex> = ErrorChannel::new();

/// Latest control snapshot for the status display and the menu
pub static STATUS: StatusBoard<CriticalSectionRawMutex> = StatusBoard::new();

/// Front panel knob, moved by the encoder task and read by the menu
pub static ROTARY: RotaryDecoder = RotaryDecoder::new(RotaryConfig {
    min: 0,
    max: 10,
    mode: RotaryMode::Bounded,
});
