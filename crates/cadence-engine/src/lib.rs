//! # cadence-engine
//!
//! Deterministic recurrence calculation for tasks and habits.
//!
//! Given a [`RecurrenceRule`] (frequency, interval, weekday or day-of-month
//! constraints, end date, timezone) and a reference date, the engine computes
//! the next occurrence, bounded occurrence sequences, whether an arbitrary date
//! is itself an occurrence, and how many scheduled days were missed between two
//! completions. It performs no I/O and keeps no state.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use cadence_engine::RecurrenceRule;
//!
//! // Mondays, Wednesdays and Fridays (Sunday = 1)
//! let rule = RecurrenceRule::weekly([2, 4, 6]).with_time_zone("UTC");
//!
//! // Tuesday 2026-10-06 -> Wednesday 2026-10-07
//! let tuesday = Utc.with_ymd_and_hms(2026, 10, 6, 9, 0, 0).unwrap();
//! let next = rule.next_occurrence(tuesday).unwrap();
//! assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 7, 9, 0, 0).unwrap());
//! assert!(rule.matches(next, tuesday));
//! ```
//!
//! ## Modules
//!
//! - [`rule`] — the rule value, constructors, validation, serialization
//! - [`context`] — calculation context and the unified base advancement
//! - [`modifier`] — weekday selection and day-of-month clamping
//! - [`calculator`] — `next_occurrence`, `occurrences`, `matches`
//! - [`streak`] — missed scheduled days and the streak state machine
//! - [`calendar`] — timezone resolution and calendar arithmetic
//! - [`dst`] — DST gap policies
//! - [`options`] — engine tunables
//! - [`error`] — error types

pub mod calculator;
pub mod calendar;
pub mod context;
pub mod dst;
pub mod error;
pub mod modifier;
pub mod options;
pub mod rule;
pub mod streak;

pub use calculator::{matches, next_occurrence, occurrences, Occurrences};
pub use dst::DstPolicy;
pub use error::CadenceError;
pub use options::EngineOptions;
pub use rule::{Frequency, RecurrenceRule, RepeatMode};
pub use streak::{count_missed_scheduled_days, Streak};
