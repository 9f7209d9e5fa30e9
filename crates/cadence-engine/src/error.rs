//! Error types for cadence-engine operations.

use thiserror::Error;

/// Errors reported when validating or decoding a recurrence rule.
///
/// Calculation functions never return these: a rule that has no further
/// occurrences yields `None`, not an error.
#[derive(Error, Debug)]
pub enum CadenceError {
    #[error("Invalid interval: {0} (expected 1 or more)")]
    InvalidInterval(i64),

    #[error("Invalid weekday number: {0} (expected 1-7, Sunday = 1)")]
    InvalidWeekday(u8),

    #[error("Weekly rule has an empty weekday set")]
    EmptyWeekdays,

    #[error("Invalid day of month: {0} (expected 1-31)")]
    InvalidDayOfMonth(u8),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout cadence-engine.
pub type Result<T> = std::result::Result<T, CadenceError>;
