//! Occurrence calculation: next occurrence, bounded sequences and date matching.
//!
//! Every function here is pure. Identical inputs yield identical outputs, and
//! nothing is cached between calls.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc};

use crate::calendar;
use crate::context::{CalculationContext, Modifier};
use crate::modifier;
use crate::options::EngineOptions;
use crate::rule::RecurrenceRule;

/// The first occurrence strictly after `after`, or `None` when the rule has
/// ended (its end date is exceeded) or cannot produce one.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    after: DateTime<Utc>,
    options: &EngineOptions,
) -> Option<DateTime<Utc>> {
    next_at_wall_time(rule, after, None, options)
}

/// [`next_occurrence`], with calendar candidates placed at `wall_time` instead
/// of the reference's own time of day.
///
/// A sequence passes its first reference's time here, so an occurrence that
/// the DST policy moved out of a gap does not move the ones after it.
fn next_at_wall_time(
    rule: &RecurrenceRule,
    after: DateTime<Utc>,
    wall_time: Option<NaiveTime>,
    options: &EngineOptions,
) -> Option<DateTime<Utc>> {
    let ctx = CalculationContext::new(rule, after, options)?;

    let next = if ctx.unit.is_elapsed() {
        ctx.advance_elapsed(after)?
    } else {
        next_on_calendar(&ctx, wall_time, options.scan_limit)?
    };

    match ctx.end_date {
        Some(end) if next > end => {
            tracing::trace!(%next, %end, "Occurrence falls after end date");
            None
        }
        _ => Some(next),
    }
}

/// Walk candidate wall times until one maps to an instant after the reference.
///
/// More than one step is only needed when the DST policy drops a candidate,
/// or an ambiguous wall time resolves to an instant not after the reference.
fn next_on_calendar(
    ctx: &CalculationContext,
    wall_time: Option<NaiveTime>,
    scan_limit: usize,
) -> Option<DateTime<Utc>> {
    let reference = ctx.reference_local();
    let mut cursor = wall_time.map_or(reference, |time| reference.date().and_time(time));
    for _ in 0..scan_limit.max(1) {
        let candidate = candidate_after(ctx, cursor)?;
        match ctx.to_instant(candidate) {
            Some(instant) if instant > ctx.reference => return Some(instant),
            _ => {
                tracing::trace!(%candidate, "Candidate dropped, advancing");
                cursor = candidate;
            }
        }
    }
    tracing::debug!(reference = %ctx.reference, scan_limit, "Scan limit reached");
    None
}

/// The next candidate wall time after `from`: the unified base advancement,
/// followed by the frequency's modifier.
fn candidate_after(ctx: &CalculationContext, from: NaiveDateTime) -> Option<NaiveDateTime> {
    match &ctx.modifier {
        Modifier::None => ctx.advance_local(from),
        Modifier::Weekdays(days) => modifier::next_selected_weekday(from, days, ctx.interval)
            .or_else(|| ctx.advance_local(from)),
        Modifier::DayOfMonth { day, lookahead, .. } => {
            if *lookahead {
                if let Some(candidate) = modifier::later_in_period(from, *day) {
                    return Some(candidate);
                }
            }
            let advanced = ctx.advance_local(from)?;
            modifier::force_day(advanced, *day)
        }
    }
}

/// Lazily generated occurrences, starting strictly after a date.
///
/// Ends when the rule produces no further occurrence or once an occurrence
/// reaches the rule's end date. Each iterator is an independent computation.
///
/// Calendar frequencies keep the local time of day of `from` for every
/// occurrence, even after one was shifted out of a DST gap.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    options: EngineOptions,
    wall_time: NaiveTime,
    cursor: Option<DateTime<Utc>>,
}

impl<'a> Occurrences<'a> {
    pub fn new(rule: &'a RecurrenceRule, from: DateTime<Utc>, options: &EngineOptions) -> Self {
        // Unknown zones are reported once the calculation resolves them.
        let tz = calendar::parse_timezone(rule.time_zone_identifier())
            .unwrap_or_else(|_| calendar::system_timezone());
        Self {
            rule,
            options: *options,
            wall_time: from.with_timezone(&tz).time(),
            cursor: Some(from),
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        let next = next_at_wall_time(self.rule, cursor, Some(self.wall_time), &self.options);
        self.cursor = match (next, self.rule.end_date()) {
            (Some(next), Some(end)) if next >= end => None,
            _ => next,
        };
        next
    }
}

/// Up to `limit` consecutive occurrences after `from`, stopping early once an
/// occurrence reaches the end date.
pub fn occurrences(
    rule: &RecurrenceRule,
    from: DateTime<Utc>,
    limit: usize,
    options: &EngineOptions,
) -> Vec<DateTime<Utc>> {
    Occurrences::new(rule, from, options).take(limit).collect()
}

/// Whether `date` is itself an occurrence of a series anchored at `anchor`.
///
/// Calendar frequencies compare local dates in the rule's timezone, so the
/// time of day of `date` does not matter. Minute and hour frequencies require
/// an exact whole number of intervals.
pub fn matches(
    rule: &RecurrenceRule,
    date: DateTime<Utc>,
    anchor: DateTime<Utc>,
    options: &EngineOptions,
) -> bool {
    let Some(ctx) = CalculationContext::new(rule, anchor, options) else {
        return false;
    };
    if ctx.end_date.is_some_and(|end| date > end) {
        return false;
    }

    let local = ctx.to_local(date).date();
    if !ctx.unit.is_elapsed() && local < ctx.reference_local().date() {
        return false;
    }

    let Some(delta) = ctx.unit_delta(anchor, date) else {
        return false;
    };
    if delta < 0 || delta % i64::from(ctx.interval) != 0 {
        return false;
    }

    match &ctx.modifier {
        Modifier::None => true,
        Modifier::Weekdays(days) => modifier::is_selected_weekday(local, days),
        Modifier::DayOfMonth { day, month, .. } => {
            month.is_none_or(|m| m == local.month())
                && local.day() == modifier::target_day(local.year(), local.month(), *day)
        }
    }
}

impl RecurrenceRule {
    /// [`next_occurrence`] with default options.
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        next_occurrence(self, after, &EngineOptions::default())
    }

    /// [`occurrences`] with default options.
    pub fn occurrences(&self, from: DateTime<Utc>, limit: usize) -> Vec<DateTime<Utc>> {
        occurrences(self, from, limit, &EngineOptions::default())
    }

    /// [`matches`] with default options.
    pub fn matches(&self, date: DateTime<Utc>, anchor: DateTime<Utc>) -> bool {
        matches(self, date, anchor, &EngineOptions::default())
    }

    /// Next due date after an occurrence was completed, re-anchored per the
    /// rule's repeat mode.
    pub fn next_due(
        &self,
        original: DateTime<Utc>,
        completed: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        self.next_occurrence(self.repeat_mode().anchor(original, completed))
    }
}
