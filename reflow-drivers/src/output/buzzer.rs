//! Piezo buzzer tunes
//!
//! The control loop must never wait on a tune, so [`Buzzer`] only posts
//! the requested [`Tune`] to a signal. A player task owning the PWM slice
//! waits on that signal and plays the notes.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use reflow_core::traits::AudibleSignal;

/// C#0 in µHz; every octave doubles it
const CSHARP_BASE_UHZ: u64 = 17_323_914;

/// Duty used while a note sounds (percent)
pub const VOLUME_PERCENT: u8 = 30;

/// One note, or a rest when `hz` is 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    pub hz: u32,
    pub ms: u32,
}

/// Sequence of notes
pub type Tune = &'static [Note];

/// Frequency of C# in `octave`, rounded to whole Hz
///
/// Valid for octaves up to 10.
pub const fn csharp_hz(octave: u8) -> u32 {
    let uhz = CSHARP_BASE_UHZ << octave;
    ((uhz + 500_000) / 1_000_000) as u32
}

/// Completion jingle: C#4 up to C#8
pub static JINGLE: [Note; 5] = [
    Note { hz: csharp_hz(4), ms: 200 },
    Note { hz: csharp_hz(5), ms: 200 },
    Note { hz: csharp_hz(6), ms: 200 },
    Note { hz: csharp_hz(7), ms: 200 },
    Note { hz: csharp_hz(8), ms: 200 },
];

/// Fault alarm: three high/low pairs
pub static FAULT_PATTERN: [Note; 6] = [
    Note { hz: csharp_hz(7), ms: 300 },
    Note { hz: csharp_hz(6), ms: 300 },
    Note { hz: csharp_hz(7), ms: 300 },
    Note { hz: csharp_hz(6), ms: 300 },
    Note { hz: csharp_hz(7), ms: 300 },
    Note { hz: csharp_hz(6), ms: 300 },
];

/// Buzzer handle posting tunes to a player task
pub struct Buzzer<'a, M: RawMutex> {
    requests: &'a Signal<M, Tune>,
}

impl<'a, M: RawMutex> Buzzer<'a, M> {
    pub fn new(requests: &'a Signal<M, Tune>) -> Self {
        Self { requests }
    }
}

impl<M: RawMutex> AudibleSignal for Buzzer<'_, M> {
    fn play_completion_jingle(&mut self) {
        self.requests.signal(&JINGLE);
    }

    fn play_fault_pattern(&mut self) {
        self.requests.signal(&FAULT_PATTERN);
    }
}
