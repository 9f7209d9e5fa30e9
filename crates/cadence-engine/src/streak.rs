//! Missed-occurrence counting and the streak state machine built on it.
//!
//! Days are compared as local calendar dates in the rule's timezone. A day the
//! rule never scheduled is never a miss; a scheduled day without a completion
//! is.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calculator::Occurrences;
use crate::calendar;
use crate::options::EngineOptions;
use crate::rule::RecurrenceRule;

/// Count scheduled days strictly between `last` and `new` that have no
/// completion.
///
/// Scheduled days come from the rule's occurrences after `last`. Without a
/// rule every day is scheduled. Both bounds are exclusive. At most
/// `options.scan_limit` distinct scheduled days are considered.
pub fn count_missed_scheduled_days(
    last: DateTime<Utc>,
    new: DateTime<Utc>,
    rule: Option<&RecurrenceRule>,
    completions: &[DateTime<Utc>],
    options: &EngineOptions,
) -> usize {
    let tz = zone_for(rule);
    let first_day = local_day(last, &tz);
    let last_day = local_day(new, &tz);
    if last_day <= first_day {
        return 0;
    }

    let completed: HashSet<NaiveDate> = completions.iter().map(|c| local_day(*c, &tz)).collect();
    let scheduled = scheduled_days_between(first_day, last_day, last, rule, &tz, options);

    scheduled.iter().filter(|day| !completed.contains(day)).count()
}

fn zone_for(rule: Option<&RecurrenceRule>) -> Tz {
    rule.map_or_else(calendar::system_timezone, |r| {
        calendar::resolve_timezone(r.time_zone_identifier())
    })
}

fn local_day(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

fn scheduled_days_between(
    first_day: NaiveDate,
    last_day: NaiveDate,
    anchor: DateTime<Utc>,
    rule: Option<&RecurrenceRule>,
    tz: &Tz,
    options: &EngineOptions,
) -> BTreeSet<NaiveDate> {
    let candidates: Box<dyn Iterator<Item = NaiveDate> + '_> = match rule {
        Some(rule) => Box::new(
            Occurrences::new(rule, anchor, options).map(move |o| local_day(o, tz)),
        ),
        None => Box::new(first_day.iter_days().skip(1)),
    };

    let mut days = BTreeSet::new();
    for day in candidates {
        if day >= last_day {
            break;
        }
        if day <= first_day || days.contains(&day) {
            continue;
        }
        if days.len() >= options.scan_limit {
            tracing::debug!(
                from = %first_day,
                to = %last_day,
                scan_limit = options.scan_limit,
                "Missed-day scan stopped at scan limit"
            );
            break;
        }
        days.insert(day);
    }
    days
}

/// A habit's streak: consecutive scheduled occurrences completed without a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub count: u32,
    pub last_completed: Option<DateTime<Utc>>,
}

impl Streak {
    /// The streak after a completion at `at`.
    ///
    /// - First completion starts the streak at 1.
    /// - A completion on the same local day as (or before) the last one leaves
    ///   the streak unchanged.
    /// - Otherwise the streak grows by one if no scheduled day was missed since
    ///   the last completion, and restarts at 1 if any was.
    ///
    /// `completions` is the full completion history used to recognise
    /// scheduled days that were in fact completed.
    pub fn record_completion(
        &self,
        at: DateTime<Utc>,
        rule: Option<&RecurrenceRule>,
        completions: &[DateTime<Utc>],
        options: &EngineOptions,
    ) -> Streak {
        let Some(last) = self.last_completed else {
            return Streak {
                count: 1,
                last_completed: Some(at),
            };
        };

        let tz = zone_for(rule);
        if local_day(at, &tz) <= local_day(last, &tz) {
            return *self;
        }

        let missed = count_missed_scheduled_days(last, at, rule, completions, options);
        let count = if missed == 0 {
            self.count.saturating_add(1)
        } else {
            tracing::debug!(missed, "Streak reset after missed scheduled days");
            1
        };

        Streak {
            count,
            last_completed: Some(at),
        }
    }
}
