//! Profile data model and text format
//!
//! File layout, one record per line:
//!
//! ```text
//! Sn63Pb37
//! 150,60,3
//! 183,30,2
//! 0,0,0
//! ```
//!
//! Line 1 is the raw profile name. Every following non-blank line is
//! `<setpoint>,<soak_seconds>,<overshoot_steps>` in decimal, with optional
//! whitespace around each token.

use core::fmt;

use heapless::{String, Vec};

use crate::error::{FormatErrorKind, ReflowError};

/// Maximum profile name length (bytes)
pub const MAX_NAME_LEN: usize = 32;

/// Maximum entries per profile
pub const MAX_ENTRIES: usize = 16;

/// Maximum overshoot prevention steps per entry
pub const MAX_OVERSHOOT_STEPS: u8 = 10;

/// One profile stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileEntry {
    /// Target PCB temperature (°C), 0 ends the run
    pub setpoint_c: u16,
    /// Time to hold once the setpoint is reached (s)
    pub soak_s: u16,
    /// Number of overshoot prevention steps before the setpoint
    pub overshoot_steps: u8,
}

impl ProfileEntry {
    pub const fn new(setpoint_c: u16, soak_s: u16, overshoot_steps: u8) -> Self {
        Self {
            setpoint_c,
            soak_s,
            overshoot_steps,
        }
    }

    /// Parse a `setpoint,soak,overshoot` line
    ///
    /// `line_no` is only used for error reporting.
    pub fn parse(line: &str, line_no: u16) -> Result<Self, ReflowError> {
        let format_error = |kind| ReflowError::ProfileFormat {
            line: line_no,
            kind,
        };

        let mut tokens = line.split(',');
        let (Some(setpoint), Some(soak), Some(overshoot), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(format_error(FormatErrorKind::FieldCount));
        };

        let setpoint_c = parse_token(setpoint).ok_or(format_error(FormatErrorKind::NotANumber))?;
        let soak_s = parse_token(soak).ok_or(format_error(FormatErrorKind::NotANumber))?;
        let overshoot_steps: u8 =
            parse_token(overshoot).ok_or(format_error(FormatErrorKind::NotANumber))?;

        if overshoot_steps > MAX_OVERSHOOT_STEPS {
            return Err(format_error(FormatErrorKind::TooManyOvershootSteps));
        }

        Ok(Self::new(setpoint_c, soak_s, overshoot_steps))
    }
}

/// Decimal integer with optional surrounding whitespace, no sign
fn parse_token<T: core::str::FromStr>(token: &str) -> Option<T> {
    let token = token.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// A named reflow profile
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReflowProfile {
    name: String<MAX_NAME_LEN>,
    entries: Vec<ProfileEntry, MAX_ENTRIES>,
}

impl ReflowProfile {
    /// Create an empty profile
    pub fn new(name: &str) -> Result<Self, ReflowError> {
        let mut stored = String::new();
        stored
            .push_str(name)
            .map_err(|_| ReflowError::ProfileFormat {
                line: 1,
                kind: FormatErrorKind::NameTooLong,
            })?;
        Ok(Self {
            name: stored,
            entries: Vec::new(),
        })
    }

    /// Build a profile from entries in code
    pub fn from_entries(name: &str, entries: &[ProfileEntry]) -> Result<Self, ReflowError> {
        let mut profile = Self::new(name)?;
        for entry in entries {
            profile.push_entry(*entry)?;
        }
        Ok(profile)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an already parsed entry
    pub fn push_entry(&mut self, entry: ProfileEntry) -> Result<(), ReflowError> {
        // Name line plus the entries so far
        let line = self.entries.len() as u16 + 2;
        self.entries
            .push(entry)
            .map_err(|_| ReflowError::ProfileFormat {
                line,
                kind: FormatErrorKind::TooManyEntries,
            })
    }

    /// Parse one profile file line and append it
    ///
    /// Blank lines are skipped. `line_no` is the 1-based line in the file.
    pub fn append_entry(&mut self, line: &str, line_no: u16) -> Result<(), ReflowError> {
        if line.trim().is_empty() {
            return Ok(());
        }

        let entry = ProfileEntry::parse(line, line_no)?;
        self.entries
            .push(entry)
            .map_err(|_| ReflowError::ProfileFormat {
                line: line_no,
                kind: FormatErrorKind::TooManyEntries,
            })
    }

    /// Serialize in the profile file format
    pub fn write_text<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "{}", self.name)?;
        for entry in &self.entries {
            writeln!(
                out,
                "{},{},{}",
                entry.setpoint_c, entry.soak_s, entry.overshoot_steps
            )?;
        }
        Ok(())
    }
}

/// Parse a complete profile file
pub fn parse_profile(text: &str) -> Result<ReflowProfile, ReflowError> {
    let mut lines = text.lines();
    let name = lines.next().ok_or(ReflowError::ProfileFormat {
        line: 1,
        kind: FormatErrorKind::Empty,
    })?;

    let mut profile = ReflowProfile::new(name)?;
    for (index, line) in lines.enumerate() {
        let line_no = u16::try_from(index + 2).unwrap_or(u16::MAX);
        profile.append_entry(line, line_no)?;
    }

    Ok(profile)
}
