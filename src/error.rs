//! Unified error types for the traffic-light firmware.
//!
//! Setup failures funnel into a single `Error` enum for `main`.  Tuning
//! rejections never abort a pass, so `TuningError` travels as an event
//! instead.  All types are `Copy` so they move through events and logs
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tuning errors
// ---------------------------------------------------------------------------

/// Which of the three `red,yellow,green` fields an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationField {
    Red,
    Yellow,
    Green,
}

impl DurationField {
    pub const ALL: [Self; 3] = [Self::Red, Self::Yellow, Self::Green];
}

impl fmt::Display for DurationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Yellow => write!(f, "yellow"),
            Self::Green => write!(f, "green"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningError {
    /// The line did not contain exactly three comma-separated fields.
    FieldCount(usize),
    /// A field is not an unsigned decimal integer (or overflows `u32`).
    InvalidNumber(DurationField),
    /// A field parsed as zero; phase durations must stay positive.
    ZeroDuration(DurationField),
    /// A field exceeds the longest delay the scheduler clock can hold.
    DurationTooLong(DurationField),
    /// The line exceeded the console line buffer.
    LineTooLong,
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount(n) => write!(f, "expected 3 fields, got {n}"),
            Self::InvalidNumber(field) => write!(f, "{field} time is not a number"),
            Self::ZeroDuration(field) => write!(f, "{field} time must be > 0"),
            Self::DurationTooLong(field) => write!(f, "{field} time is too long"),
            Self::LineTooLong => write!(f, "line too long"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(field) => write!(f, "validation failed: {field}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
