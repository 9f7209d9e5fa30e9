//! Timezone resolution and month/week arithmetic on local calendar dates.
//!
//! Rules store a portable IANA identifier; it is resolved to a `chrono-tz` zone
//! only when a calculation runs. Month lengths are recomputed for every target
//! month, never carried over from another month.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{CadenceError, Result};

/// Parse an IANA timezone identifier (e.g., "America/Los_Angeles").
///
/// # Errors
/// Returns `CadenceError::InvalidTimezone` if the identifier is unknown.
pub fn parse_timezone(identifier: &str) -> Result<Tz> {
    identifier
        .parse()
        .map_err(|_| CadenceError::InvalidTimezone(identifier.to_string()))
}

/// Resolve a rule's timezone identifier, substituting the system timezone when
/// the identifier cannot be resolved.
pub fn resolve_timezone(identifier: &str) -> Tz {
    match parse_timezone(identifier) {
        Ok(tz) => tz,
        Err(_) => {
            let fallback = system_timezone();
            tracing::warn!(
                identifier = %identifier,
                fallback = %fallback.name(),
                "Unrecognized timezone identifier, using system timezone"
            );
            fallback
        }
    }
}

/// The timezone of the running system.
///
/// Checks `TZ` first, then the `/etc/localtime` link, and settles on UTC when
/// neither names a known zone.
pub fn system_timezone() -> Tz {
    std::env::var("TZ")
        .ok()
        .and_then(|name| name.trim_start_matches(':').parse().ok())
        .or_else(|| {
            let target = std::fs::read_link("/etc/localtime").ok()?;
            let path = target.to_string_lossy().into_owned();
            let (_, name) = path.split_once("zoneinfo/")?;
            name.parse().ok()
        })
        .unwrap_or(Tz::UTC)
}

/// Identifier of [`system_timezone`], used as the default for new rules.
pub fn system_timezone_name() -> String {
    system_timezone().name().to_string()
}

/// Parse a datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (with offset), a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC)
/// and a bare `YYYY-MM-DD` (midnight UTC).
///
/// # Errors
/// Returns `CadenceError::InvalidDate` if none of the formats match.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
        .ok_or_else(|| CadenceError::InvalidDate(s.to_string()))
}

/// Weekday number in the Sunday = 1 ... Saturday = 7 convention.
pub fn weekday_number(weekday: Weekday) -> u8 {
    // number_from_sunday() is always 1..=7
    weekday.number_from_sunday() as u8
}

/// Inverse of [`weekday_number`]; `None` outside 1..=7.
pub fn weekday_from_number(number: u8) -> Option<Weekday> {
    match number {
        1 => Some(Weekday::Sun),
        2 => Some(Weekday::Mon),
        3 => Some(Weekday::Tue),
        4 => Some(Weekday::Wed),
        5 => Some(Weekday::Thu),
        6 => Some(Weekday::Fri),
        7 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Number of days in the given month (28-31).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}

/// The requested day in the given month, clamped to the month's last day.
///
/// Day 31 in April yields April 30; day 29 in a non-leap February yields the
/// 28th. Days below 1 clamp up to the 1st.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month);
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

/// Move `months` calendar months from `date`, landing on `day` clamped to the
/// length of the target month.
pub fn add_months(date: NaiveDate, months: i64, day: u32) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    clamped_date(year, month, day)
}

/// Signed number of calendar months from `from` to `to`, ignoring the day.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (i64::from(to.year()) * 12 + i64::from(to.month0()))
        - (i64::from(from.year()) * 12 + i64::from(from.month0()))
}

/// The Sunday that opens the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn february_length_follows_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn add_months_clamps_per_target_month() {
        let jan31 = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(
            add_months(jan31, 1, 31),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
        assert_eq!(
            add_months(jan31, 2, 31),
            NaiveDate::from_ymd_opt(2026, 3, 31)
        );
        assert_eq!(
            add_months(jan31, 3, 31),
            NaiveDate::from_ymd_opt(2026, 4, 30)
        );
        assert_eq!(
            add_months(jan31, -2, 31),
            NaiveDate::from_ymd_opt(2025, 11, 30)
        );
    }

    #[test]
    fn weekday_numbers_start_on_sunday() {
        assert_eq!(weekday_number(Weekday::Sun), 1);
        assert_eq!(weekday_number(Weekday::Sat), 7);
        for n in 1..=7 {
            assert_eq!(weekday_from_number(n).map(weekday_number), Some(n));
        }
        assert_eq!(weekday_from_number(0), None);
        assert_eq!(weekday_from_number(8), None);
    }

    #[test]
    fn start_of_week_is_sunday() {
        // 2026-10-21 is a Wednesday
        let wed = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert_eq!(start_of_week(wed), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let sun = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(start_of_week(sun), sun);
    }

    #[test]
    fn parse_datetime_accepts_three_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(parse_datetime("2026-03-01T09:00:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2026-03-01T10:00:00+01:00").unwrap(), expected);
        assert_eq!(parse_datetime("2026-03-01T09:00:00").unwrap(), expected);
        assert!(parse_datetime("2026-03-01").is_ok());
        assert!(matches!(
            parse_datetime("next tuesday"),
            Err(CadenceError::InvalidDate(_))
        ));
    }

    #[test]
    fn unknown_timezone_is_rejected_by_parse() {
        assert!(parse_timezone("America/Los_Angeles").is_ok());
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(CadenceError::InvalidTimezone(_))
        ));
    }
}
