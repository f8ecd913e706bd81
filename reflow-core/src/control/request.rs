//! Requests from the user interface to the control loop

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

/// Requests the control loop can hold between two ticks
pub const MAX_PENDING_REQUESTS: usize = 4;

/// User request, applied at the start of the next control tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRequest {
    /// Start a run with the loaded profile
    Start,
    /// Stop the current run
    Cancel,
    /// Load the n-th profile file from storage
    LoadProfile(u8),
    /// Switch the oven light to the opposite state
    ToggleLight,
}

/// FIFO of requests; every request sent is applied once, in order
pub type RequestQueue<M> = Channel<M, ControlRequest, MAX_PENDING_REQUESTS>;
