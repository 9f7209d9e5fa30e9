//! Frequency modifiers: weekday selection and day-of-month clamping.
//!
//! Both the generative path (`next_occurrence`) and the predicate path
//! (`matches`) go through these functions, so they agree on what a valid
//! weekday or month day is.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

use crate::calendar;

/// Next selected weekday after `from`.
///
/// Picks the smallest selected weekday later in `from`'s (Sunday-based) week.
/// When there is none, jumps `interval` weeks ahead and lands on the smallest
/// selected weekday of that week. Time of day is kept. `None` if the set holds
/// no weekday in 1..=7.
pub fn next_selected_weekday(
    from: NaiveDateTime,
    days: &BTreeSet<u8>,
    interval: u32,
) -> Option<NaiveDateTime> {
    let current = calendar::weekday_number(from.weekday());
    let mut valid = days.iter().copied().filter(|d| (1..=7).contains(d));

    if let Some(day) = valid.clone().find(|&d| d > current) {
        return from.checked_add_days(Days::new(u64::from(day - current)));
    }

    let first = valid.next()?;
    let week_start = from.checked_sub_days(Days::new(u64::from(current - 1)))?;
    let offset = 7 * u64::from(interval) + u64::from(first - 1);
    week_start.checked_add_days(Days::new(offset))
}

/// Whether `date` falls on one of the selected weekdays.
pub fn is_selected_weekday(date: NaiveDate, days: &BTreeSet<u8>) -> bool {
    days.contains(&calendar::weekday_number(date.weekday()))
}

/// The day of month an occurrence lands on in `year`/`month` when `day` is
/// requested: `day` itself, or the month's last day when the month is shorter.
pub fn target_day(year: i32, month: u32, day: u32) -> u32 {
    day.clamp(1, calendar::days_in_month(year, month))
}

/// Replace the day of month of `at`, clamping to the length of `at`'s month.
pub fn force_day(at: NaiveDateTime, day: u32) -> Option<NaiveDateTime> {
    let date = calendar::clamped_date(at.year(), at.month(), day)?;
    Some(date.and_time(at.time()))
}

/// The occurrence on `day` within `from`'s own month, if it is still ahead.
pub fn later_in_period(from: NaiveDateTime, day: u32) -> Option<NaiveDateTime> {
    force_day(from, day).filter(|candidate| *candidate > from)
}
