//! Quadrature rotary encoder decoding
//!
//! Table-driven full-step decoder. Every edge on either line feeds the
//! current CLK/DT sample into [`RotaryDecoder::on_edge`]; the table only
//! reports a direction on the transition that completes a detent, so
//! bounce and half steps settle back to the start state without moving
//! the position.
//!
//! All state lives in atomics so the decoder can be shared as a `static`
//! between the edge handler and the menu task.

use portable_atomic::{AtomicI32, AtomicU8, Ordering};
use reflow_core::config::{RotaryConfig, RotaryMode};

use super::button::PushButton;

const DIR_CW: u8 = 0x10;
const DIR_CCW: u8 = 0x20;
const DIR_MASK: u8 = 0x30;
const STATE_MASK: u8 = 0x07;

const START: u8 = 0x0;
const CW_1: u8 = 0x1;
const CW_2: u8 = 0x2;
const CW_3: u8 = 0x3;
const CCW_1: u8 = 0x4;
const CCW_2: u8 = 0x5;
const CCW_3: u8 = 0x6;

/// Next state per current state, indexed by the `CLK << 1 | DT` sample
const TRANSITIONS: [[u8; 4]; 8] = [
    // 00      01      10      11
    [START, CCW_1, CW_1, START],            // START
    [CW_2, START, CW_1, START],             // CW_1
    [CW_2, CW_3, CW_1, START],              // CW_2
    [CW_2, CW_3, START, START | DIR_CW],    // CW_3
    [CCW_2, CCW_1, START, START],           // CCW_1
    [CCW_2, CCW_1, CCW_3, START],           // CCW_2
    [CCW_2, START, CCW_3, START | DIR_CCW], // CCW_3
    [START, START, START, START],           // ILLEGAL
];

/// Position and button state read by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotaryValue {
    pub position: i32,
    /// Press seen since the last read
    pub pressed: bool,
}

/// Interrupt-safe quadrature decoder with a push button
pub struct RotaryDecoder {
    /// Table state, direction bits of the last transition included
    state: AtomicU8,
    position: AtomicI32,
    min: AtomicI32,
    max: AtomicI32,
    mode: AtomicU8,
    button: PushButton,
}

impl RotaryDecoder {
    /// Create a decoder at `config.min`
    pub const fn new(config: RotaryConfig) -> Self {
        Self {
            state: AtomicU8::new(START),
            position: AtomicI32::new(config.min),
            min: AtomicI32::new(config.min),
            max: AtomicI32::new(config.max),
            mode: AtomicU8::new(config.mode.as_u8()),
            button: PushButton::new(),
        }
    }

    /// Feed one CLK/DT sample and return the applied increment
    ///
    /// Called on every edge of either line. Never fails: unexpected
    /// samples walk the table back to the start state.
    pub fn on_edge(&self, clk: bool, dt: bool) -> i8 {
        let sample = ((clk as usize) << 1) | dt as usize;
        let current = self.state.load(Ordering::Relaxed) & STATE_MASK;
        let next = TRANSITIONS[current as usize][sample];
        self.state.store(next, Ordering::Relaxed);

        let increment: i8 = match next & DIR_MASK {
            DIR_CW => 1,
            DIR_CCW => -1,
            _ => return 0,
        };

        let (min, max) = self.range();
        let mode = self.mode();
        // Only the edge handler moves the position; `set_range` and `reset`
        // race benignly with it
        let _ = self
            .position
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |position| {
                Some(apply(position, increment as i32, min, max, mode))
            });
        increment
    }

    /// Current position and press flag, clearing the flag
    pub fn value(&self) -> RotaryValue {
        RotaryValue {
            position: self.position(),
            pressed: self.button.take_pressed(),
        }
    }

    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }

    /// Set the position back to 0, or the nearest value in range when
    /// the mode is bounded or wrapping
    pub fn reset(&self) {
        let position = match self.mode() {
            RotaryMode::Unbounded => 0,
            _ => {
                let (min, max) = self.range();
                0i32.clamp(min, max)
            }
        };
        self.position.store(position, Ordering::Release);
    }

    /// Change the range, moving the position into it when bounded
    ///
    /// `min` and `max` are swapped if given in the wrong order.
    pub fn set_range(&self, min: i32, max: i32, mode: RotaryMode) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min.store(min, Ordering::Release);
        self.max.store(max, Ordering::Release);
        self.mode.store(mode.as_u8(), Ordering::Release);

        if mode != RotaryMode::Unbounded {
            let _ = self
                .position
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |position| {
                    Some(position.clamp(min, max))
                });
        }
    }

    pub fn range(&self) -> (i32, i32) {
        (
            self.min.load(Ordering::Acquire),
            self.max.load(Ordering::Acquire),
        )
    }

    pub fn mode(&self) -> RotaryMode {
        RotaryMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// The push button sharing this knob
    pub fn button(&self) -> &PushButton {
        &self.button
    }
}

fn apply(position: i32, increment: i32, min: i32, max: i32, mode: RotaryMode) -> i32 {
    match mode {
        RotaryMode::Unbounded => position.wrapping_add(increment),
        RotaryMode::Bounded => position.saturating_add(increment).clamp(min, max),
        RotaryMode::Wrap => {
            let span = max as i64 - min as i64 + 1;
            let offset = position as i64 - min as i64 + increment as i64;
            (min as i64 + offset.rem_euclid(span)) as i32
        }
    }
}
