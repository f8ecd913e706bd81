//! Control state snapshot for cross-task readers

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::control::ControlPhase;

/// Everything the status display shows, copied out of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermalSnapshot {
    pub phase: ControlPhase,
    pub reflowing: bool,
    /// Current setpoint (°C), 0 when idle
    pub setpoint_c: u16,
    /// Soak time of the current setpoint (s)
    pub soak_s: u16,
    /// Time spent soaking so far (ms)
    pub soak_elapsed_ms: u32,
    /// Heater duty readback (percent)
    pub top_duty: u8,
    pub bottom_duty: u8,
    pub fan_duty: u8,
    pub light_on: bool,
    /// Last PCB temperature (°C × 10), `None` if the channel failed
    pub pcb_temp_x10: Option<i16>,
}

impl ThermalSnapshot {
    pub const fn idle() -> Self {
        Self {
            phase: ControlPhase::Idle,
            reflowing: false,
            setpoint_c: 0,
            soak_s: 0,
            soak_elapsed_ms: 0,
            top_duty: 0,
            bottom_duty: 0,
            fan_duty: 0,
            light_on: false,
            pcb_temp_x10: None,
        }
    }
}

impl Default for ThermalSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// Latest [`ThermalSnapshot`], written by the control loop only
///
/// The whole snapshot is replaced inside one critical section so readers
/// never see half of an update.
pub struct StatusBoard<M: RawMutex> {
    slot: Mutex<M, Cell<ThermalSnapshot>>,
}

impl<M: RawMutex> StatusBoard<M> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(ThermalSnapshot::idle())),
        }
    }

    pub fn publish(&self, snapshot: ThermalSnapshot) {
        self.slot.lock(|slot| slot.set(snapshot));
    }

    pub fn read(&self) -> ThermalSnapshot {
        self.slot.lock(|slot| slot.get())
    }
}

impl<M: RawMutex> Default for StatusBoard<M> {
    fn default() -> Self {
        Self::new()
    }
}
