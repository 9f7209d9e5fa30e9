//! The recurrence rule value and its validation.
//!
//! A [`RecurrenceRule`] is pure configuration: it carries no computed state
//! and is replaced wholesale on edit. The `with_*` methods return a new rule.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::calendar;
use crate::error::{CadenceError, Result};
use crate::options::EngineOptions;

/// Base repetition granularity of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Reserved. Always invalid; calculations produce nothing for it.
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Minutely => "minutely",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        }
    }

    /// Singular unit noun used in descriptions ("every 2 weeks").
    fn unit_noun(self) -> &'static str {
        match self {
            Frequency::Minutely => "minute",
            Frequency::Hourly => "hour",
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Yearly => "year",
            Frequency::Custom => "period",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which date a caller should re-anchor on after an occurrence is handled.
///
/// The engine itself never reads this; owners use it to pick the reference
/// date passed to [`RecurrenceRule::next_occurrence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepeatMode {
    /// Next due date follows the schedule, regardless of when it was completed.
    #[default]
    FromOriginalDate,
    /// Next due date is computed from the moment of completion.
    FromCompletionDate,
}

impl RepeatMode {
    /// The anchor to advance from, given the original due date and the
    /// completion time.
    pub fn anchor(self, original: DateTime<Utc>, completed: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            RepeatMode::FromOriginalDate => original,
            RepeatMode::FromCompletionDate => completed,
        }
    }
}

/// A declarative recurrence rule.
///
/// Serialized as a camelCase record: `frequency`, `interval`, `daysOfWeek`
/// (Sunday = 1), `dayOfMonth`, `endDate`, `repeatMode`, `timeZoneIdentifier`.
/// The timezone is always kept as its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    frequency: Frequency,
    #[serde(default = "default_interval", deserialize_with = "deserialize_interval")]
    interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days_of_week: Option<BTreeSet<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_of_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    repeat_mode: RepeatMode,
    #[serde(default = "calendar::system_timezone_name")]
    time_zone_identifier: String,
}

fn default_interval() -> u32 {
    1
}

fn clamp_interval(interval: i64) -> u32 {
    u32::try_from(interval.max(1)).unwrap_or(u32::MAX)
}

fn deserialize_interval<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_interval)
}

impl RecurrenceRule {
    /// Create a rule with the given frequency; intervals below 1 are clamped to 1.
    ///
    /// The timezone defaults to the system timezone.
    pub fn new(frequency: Frequency, interval: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            frequency,
            interval: clamp_interval(interval),
            days_of_week: None,
            day_of_month: None,
            end_date: None,
            repeat_mode: RepeatMode::default(),
            time_zone_identifier: calendar::system_timezone_name(),
        }
    }

    /// Like [`RecurrenceRule::new`], but rejects intervals below 1 instead of
    /// clamping them.
    ///
    /// # Errors
    /// Returns `CadenceError::InvalidInterval` when `interval < 1`.
    pub fn try_new(frequency: Frequency, interval: i64) -> Result<Self> {
        if interval < 1 {
            return Err(CadenceError::InvalidInterval(interval));
        }
        Ok(Self::new(frequency, interval))
    }

    pub fn minutely() -> Self {
        Self::new(Frequency::Minutely, 1)
    }

    pub fn hourly() -> Self {
        Self::new(Frequency::Hourly, 1)
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily, 1)
    }

    /// Weekly on the given weekdays (Sunday = 1). An empty list means "the
    /// reference date's weekday".
    pub fn weekly(days: impl IntoIterator<Item = u8>) -> Self {
        let days: BTreeSet<u8> = days.into_iter().collect();
        Self::new(Frequency::Weekly, 1).with_days_of_week((!days.is_empty()).then_some(days))
    }

    /// Monthly on the reference date's day of month.
    pub fn monthly() -> Self {
        Self::new(Frequency::Monthly, 1)
    }

    /// Monthly on a fixed day, clamped to the end of shorter months.
    pub fn monthly_on(day: u8) -> Self {
        Self::monthly().with_day_of_month(Some(day))
    }

    /// Yearly on the reference date's month and day.
    pub fn yearly() -> Self {
        Self::new(Frequency::Yearly, 1)
    }

    /// Yearly in the reference date's month, on a fixed day.
    pub fn yearly_on(day: u8) -> Self {
        Self::yearly().with_day_of_month(Some(day))
    }

    pub fn with_interval(self, interval: i64) -> Self {
        Self {
            interval: clamp_interval(interval),
            ..self
        }
    }

    pub fn with_days_of_week(self, days_of_week: Option<BTreeSet<u8>>) -> Self {
        Self {
            days_of_week,
            ..self
        }
    }

    pub fn with_day_of_month(self, day_of_month: Option<u8>) -> Self {
        Self {
            day_of_month,
            ..self
        }
    }

    pub fn with_end_date(self, end_date: Option<DateTime<Utc>>) -> Self {
        Self { end_date, ..self }
    }

    pub fn with_repeat_mode(self, repeat_mode: RepeatMode) -> Self {
        Self {
            repeat_mode,
            ..self
        }
    }

    pub fn with_time_zone(self, identifier: impl Into<String>) -> Self {
        Self {
            time_zone_identifier: identifier.into(),
            ..self
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Always at least 1.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn days_of_week(&self) -> Option<&BTreeSet<u8>> {
        self.days_of_week.as_ref()
    }

    pub fn day_of_month(&self) -> Option<u8> {
        self.day_of_month
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn time_zone_identifier(&self) -> &str {
        &self.time_zone_identifier
    }

    /// Check the structural invariants with default options.
    ///
    /// # Errors
    /// See [`RecurrenceRule::validate_with`].
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&EngineOptions::default())
    }

    /// Check the rule's invariants, reporting the first violation.
    ///
    /// # Errors
    /// - `UnsupportedFrequency` for the reserved `custom` frequency.
    /// - `EmptyWeekdays` / `InvalidWeekday` for a weekly weekday set that is
    ///   empty or holds a value outside 1..=7.
    /// - `InvalidDayOfMonth` for a monthly/yearly day outside 1..=31.
    /// - `InvalidTimezone` for an unknown identifier, only when
    ///   `options.strict_timezones` is set.
    pub fn validate_with(&self, options: &EngineOptions) -> Result<()> {
        match self.frequency {
            Frequency::Custom => {
                return Err(CadenceError::UnsupportedFrequency(
                    self.frequency.to_string(),
                ))
            }
            Frequency::Weekly => {
                if let Some(days) = &self.days_of_week {
                    if days.is_empty() {
                        return Err(CadenceError::EmptyWeekdays);
                    }
                    if let Some(&day) = days.iter().find(|d| !(1..=7).contains(*d)) {
                        return Err(CadenceError::InvalidWeekday(day));
                    }
                }
            }
            Frequency::Monthly | Frequency::Yearly => {
                if let Some(day) = self.day_of_month {
                    if !(1..=31).contains(&day) {
                        return Err(CadenceError::InvalidDayOfMonth(day));
                    }
                }
            }
            Frequency::Minutely | Frequency::Hourly | Frequency::Daily => {}
        }

        if options.strict_timezones {
            calendar::parse_timezone(&self.time_zone_identifier)?;
        }

        Ok(())
    }

    /// Whether the rule satisfies its structural invariants.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Decode a rule from its JSON record.
    ///
    /// # Errors
    /// Returns `CadenceError::Json` if the record is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the rule as its JSON record.
    ///
    /// # Errors
    /// Returns `CadenceError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short human-readable summary, e.g. "every 2 weeks on Mon, Wed, Fri".
    pub fn describe(&self) -> String {
        let noun = self.frequency.unit_noun();
        let mut text = if self.interval == 1 {
            format!("every {noun}")
        } else {
            format!("every {} {noun}s", self.interval)
        };

        match self.frequency {
            Frequency::Weekly => {
                if let Some(days) = &self.days_of_week {
                    let names: Vec<String> = days
                        .iter()
                        .filter_map(|&d| calendar::weekday_from_number(d))
                        .map(|w| w.to_string())
                        .collect();
                    if !names.is_empty() {
                        text.push_str(&format!(" on {}", names.join(", ")));
                    }
                }
            }
            Frequency::Monthly | Frequency::Yearly => {
                if let Some(day) = self.day_of_month {
                    text.push_str(&format!(" on day {day}"));
                }
            }
            _ => {}
        }

        if let Some(end) = self.end_date {
            text.push_str(&format!(" until {}", end.format("%Y-%m-%d")));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_below_one_is_clamped() {
        assert_eq!(RecurrenceRule::new(Frequency::Daily, 0).interval(), 1);
        assert_eq!(RecurrenceRule::new(Frequency::Daily, -4).interval(), 1);
        assert_eq!(RecurrenceRule::daily().with_interval(3).interval(), 3);
    }

    #[test]
    fn weekly_with_no_days_stores_none() {
        assert!(RecurrenceRule::weekly([]).days_of_week().is_none());
        let rule = RecurrenceRule::weekly([6, 2, 4, 2]);
        let days: Vec<u8> = rule.days_of_week().unwrap().iter().copied().collect();
        assert_eq!(days, vec![2, 4, 6]);
    }

    #[test]
    fn describe_reads_naturally() {
        let rule = RecurrenceRule::weekly([2, 4, 6]).with_interval(2);
        assert_eq!(rule.describe(), "every 2 weeks on Mon, Wed, Fri");
        assert_eq!(RecurrenceRule::daily().describe(), "every day");
        assert_eq!(RecurrenceRule::monthly_on(31).describe(), "every month on day 31");
    }
}
