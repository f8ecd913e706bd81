//! Reflow errors and the process-wide error mailbox
//!
//! Every recoverable error ends up in an [`ErrorChannel`]: a single slot the
//! status display polls and clears once per refresh.

use core::cell::RefCell;
use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

/// Maximum length of a stored error message
pub const MAX_ERROR_MESSAGE_LEN: usize = 64;

/// What was wrong with a profile line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatErrorKind {
    /// Line does not split into exactly three comma separated tokens
    FieldCount,
    /// A token is not a non-negative decimal integer
    NotANumber,
    /// Profile holds more entries than fit in memory
    TooManyEntries,
    /// Profile name exceeds its fixed capacity
    NameTooLong,
    /// Overshoot step count exceeds the supported maximum
    TooManyOvershootSteps,
    /// File contains no name line
    Empty,
    /// File is not valid UTF-8 text
    InvalidUtf8,
}

/// Unanticipated failure inside the control tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// A heater refused a duty update
    HeaterOutput,
    /// The PCB thermocouple produced no reading
    SensorFault,
}

/// Errors raised by the reflow subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReflowError {
    /// Malformed profile, `line` is 1-based
    ProfileFormat { line: u16, kind: FormatErrorKind },
    /// No profile (or an empty one) is available to start a run
    ProfileMissing,
    /// Storage medium absent or not mounted
    StorageUnavailable,
    /// Fault inside the control tick; heaters were shut off
    ControlLoopFault(FaultKind),
}

impl fmt::Display for ReflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflowError::ProfileFormat { line, kind } => match kind {
                FormatErrorKind::FieldCount => write!(f, "Profile syntax error in line {}", line),
                FormatErrorKind::NotANumber => {
                    write!(f, "Non numeric value in profile line {}", line)
                }
                FormatErrorKind::TooManyEntries => {
                    write!(f, "Too many profile entries at line {}", line)
                }
                FormatErrorKind::NameTooLong => f.write_str("Profile name too long"),
                FormatErrorKind::TooManyOvershootSteps => {
                    write!(f, "Too many overshoot steps in line {}", line)
                }
                FormatErrorKind::Empty => f.write_str("Empty profile"),
                FormatErrorKind::InvalidUtf8 => f.write_str("Profile is not valid text"),
            },
            ReflowError::ProfileMissing => f.write_str("No Reflow Profile!"),
            ReflowError::StorageUnavailable => f.write_str("SD card not mounted."),
            ReflowError::ControlLoopFault(FaultKind::HeaterOutput) => {
                f.write_str("Heater fault! Please, open oven door!")
            }
            ReflowError::ControlLoopFault(FaultKind::SensorFault) => {
                f.write_str("Thermocouple fault! Please, open oven door!")
            }
        }
    }
}

/// Contents of the error mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorRecord {
    /// Short human-readable status message
    pub message: String<MAX_ERROR_MESSAGE_LEN>,
    /// Originating error, if any
    pub cause: Option<ReflowError>,
}

/// Single-slot error mailbox
///
/// Writers overwrite whatever is pending; [`ErrorChannel::take`] reads and
/// clears in one critical section. Intended to live in a `static` with a
/// `CriticalSectionRawMutex` so any task can report into it.
pub struct ErrorChannel<M: RawMutex> {
    slot: Mutex<M, RefCell<Option<ErrorRecord>>>,
}

impl<M: RawMutex> ErrorChannel<M> {
    /// Create an empty mailbox
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store a message with an optional cause
    ///
    /// Messages longer than [`MAX_ERROR_MESSAGE_LEN`] are truncated on a
    /// character boundary.
    pub fn set(&self, message: &str, cause: Option<ReflowError>) {
        let mut stored = String::new();
        for c in message.chars() {
            if stored.push(c).is_err() {
                break;
            }
        }
        self.store(ErrorRecord {
            message: stored,
            cause,
        });
    }

    /// Store an error using its display text as the message
    pub fn record(&self, error: ReflowError) {
        let mut message = String::new();
        // All display texts fit the slot
        let _ = write!(message, "{}", error);
        self.store(ErrorRecord {
            message,
            cause: Some(error),
        });
    }

    /// Read and clear the pending record
    pub fn take(&self) -> Option<ErrorRecord> {
        self.slot.lock(|slot| slot.borrow_mut().take())
    }

    /// Check for a pending record without clearing it
    pub fn is_set(&self) -> bool {
        self.slot.lock(|slot| slot.borrow().is_some())
    }

    fn store(&self, record: ErrorRecord) {
        self.slot.lock(|slot| *slot.borrow_mut() = Some(record));
    }
}

impl<M: RawMutex> Default for ErrorChannel<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_take_clears() {
        let channel: ErrorChannel<NoopRawMutex> = ErrorChannel::new();
        assert!(channel.take().is_none());

        channel.record(ReflowError::ProfileMissing);
        assert!(channel.is_set());

        let record = channel.take().unwrap();
        assert_eq!(record.message.as_str(), "No Reflow Profile!");
        assert_eq!(record.cause, Some(ReflowError::ProfileMissing));
        assert!(channel.take().is_none());
    }

    #[test]
    fn test_latest_write_wins() {
        let channel: ErrorChannel<NoopRawMutex> = ErrorChannel::new();
        channel.record(ReflowError::StorageUnavailable);
        channel.set("Default profile not found", None);

        let record = channel.take().unwrap();
        assert_eq!(record.message.as_str(), "Default profile not found");
        assert_eq!(record.cause, None);
    }

    #[test]
    fn test_long_message_truncated() {
        let channel: ErrorChannel<NoopRawMutex> = ErrorChannel::new();
        // 40 two-byte characters
        let long = "°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°°";
        channel.set(long, None);

        let record = channel.take().unwrap();
        assert!(record.message.len() <= MAX_ERROR_MESSAGE_LEN);
        assert!(record.message.chars().all(|c| c == '°'));
    }

    #[test]
    fn test_format_error_display() {
        let mut text: String<64> = String::new();
        write!(
            text,
            "{}",
            ReflowError::ProfileFormat {
                line: 3,
                kind: FormatErrorKind::NotANumber
            }
        )
        .unwrap();
        assert_eq!(text.as_str(), "Non numeric value in profile line 3");
    }
}
