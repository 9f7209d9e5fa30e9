//! The calculation context: rule fields, a resolved timezone and a reference
//! date, grouped so every frequency shares one advancement step.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::calendar;
use crate::dst::DstPolicy;
use crate::options::EngineOptions;
use crate::rule::{Frequency, RecurrenceRule};

/// The calendar unit a frequency advances by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl BaseUnit {
    /// `None` for the reserved `custom` frequency.
    pub fn of(frequency: Frequency) -> Option<Self> {
        match frequency {
            Frequency::Minutely => Some(BaseUnit::Minute),
            Frequency::Hourly => Some(BaseUnit::Hour),
            Frequency::Daily => Some(BaseUnit::Day),
            Frequency::Weekly => Some(BaseUnit::Week),
            Frequency::Monthly => Some(BaseUnit::Month),
            Frequency::Yearly => Some(BaseUnit::Year),
            Frequency::Custom => None,
        }
    }

    /// Minute and hour steps are elapsed time; the rest follow the local calendar.
    pub fn is_elapsed(self) -> bool {
        matches!(self, BaseUnit::Minute | BaseUnit::Hour)
    }
}

/// Post-advancement adjustment for a frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// No adjustment (minutely, hourly, daily).
    None,
    /// Land on one of these weekdays (Sunday = 1). Plain weekly rules use the
    /// reference date's weekday as a one-element set.
    Weekdays(BTreeSet<u8>),
    /// Force the day of month, clamped to the target month's length.
    DayOfMonth {
        day: u32,
        /// Yearly rules also pin the reference date's month.
        month: Option<u32>,
        /// The configured day may still lie ahead in the reference period.
        lookahead: bool,
    },
}

/// Immutable inputs for a single calculation.
#[derive(Debug, Clone)]
pub struct CalculationContext {
    pub frequency: Frequency,
    pub unit: BaseUnit,
    pub interval: u32,
    pub end_date: Option<DateTime<Utc>>,
    pub tz: Tz,
    pub reference: DateTime<Utc>,
    pub dst_policy: DstPolicy,
    pub modifier: Modifier,
}

impl CalculationContext {
    /// Build a context for `rule` at `reference`, or `None` for a frequency
    /// without a base unit.
    pub fn new(
        rule: &RecurrenceRule,
        reference: DateTime<Utc>,
        options: &EngineOptions,
    ) -> Option<Self> {
        let unit = BaseUnit::of(rule.frequency())?;
        let tz = calendar::resolve_timezone(rule.time_zone_identifier());
        let local = reference.with_timezone(&tz).naive_local();
        let modifier = modifier_for(rule, local.date());

        Some(Self {
            frequency: rule.frequency(),
            unit,
            interval: rule.interval().max(1),
            end_date: rule.end_date(),
            tz,
            reference,
            dst_policy: options.dst_policy,
            modifier,
        })
    }

    /// The reference date as wall-clock time in the rule's timezone.
    pub fn reference_local(&self) -> NaiveDateTime {
        self.to_local(self.reference)
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    /// Map a wall-clock time back to an instant under the DST policy.
    pub fn to_instant(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.dst_policy
            .resolve(&self.tz, local)
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Advance an instant by `interval` elapsed units (minute and hour only).
    pub fn advance_elapsed(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let step = i64::from(self.interval);
        let delta = match self.unit {
            BaseUnit::Minute => Duration::try_minutes(step)?,
            BaseUnit::Hour => Duration::try_hours(step)?,
            _ => return None,
        };
        from.checked_add_signed(delta)
    }

    /// Advance a wall-clock time by `interval` calendar units, keeping the
    /// time of day. Month and year steps keep the day of month, clamped to the
    /// target month.
    pub fn advance_local(&self, from: NaiveDateTime) -> Option<NaiveDateTime> {
        let step = u64::from(self.interval);
        let date = from.date();
        let advanced = match self.unit {
            BaseUnit::Minute => return from.checked_add_signed(Duration::try_minutes(step as i64)?),
            BaseUnit::Hour => return from.checked_add_signed(Duration::try_hours(step as i64)?),
            BaseUnit::Day => date.checked_add_days(Days::new(step))?,
            BaseUnit::Week => date.checked_add_days(Days::new(step.checked_mul(7)?))?,
            BaseUnit::Month => calendar::add_months(date, step as i64, date.day())?,
            BaseUnit::Year => calendar::add_months(date, (step as i64).checked_mul(12)?, date.day())?,
        };
        Some(advanced.and_time(from.time()))
    }

    /// Whole units from `anchor` to `date`, measured on local calendar dates
    /// for calendar units. `None` when an elapsed delta is not a whole number
    /// of units.
    pub fn unit_delta(&self, anchor: DateTime<Utc>, date: DateTime<Utc>) -> Option<i64> {
        let from = self.to_local(anchor).date();
        let to = self.to_local(date).date();
        let delta = match self.unit {
            BaseUnit::Minute => return whole_units(date - anchor, Duration::minutes(1)),
            BaseUnit::Hour => return whole_units(date - anchor, Duration::hours(1)),
            BaseUnit::Day => (to - from).num_days(),
            BaseUnit::Week => {
                (calendar::start_of_week(to) - calendar::start_of_week(from)).num_days() / 7
            }
            BaseUnit::Month => calendar::months_between(from, to),
            BaseUnit::Year => i64::from(to.year() - from.year()),
        };
        Some(delta)
    }
}

fn whole_units(elapsed: Duration, unit: Duration) -> Option<i64> {
    let unit_secs = unit.num_seconds();
    let secs = elapsed.num_seconds();
    let exact = elapsed.subsec_nanos() == 0 && secs % unit_secs == 0;
    exact.then_some(secs / unit_secs)
}

fn modifier_for(rule: &RecurrenceRule, reference: NaiveDate) -> Modifier {
    match rule.frequency() {
        Frequency::Weekly => {
            let configured: BTreeSet<u8> = rule
                .days_of_week()
                .map(|days| days.iter().copied().filter(|d| (1..=7).contains(d)).collect())
                .unwrap_or_default();
            if configured.is_empty() {
                Modifier::Weekdays(BTreeSet::from([calendar::weekday_number(
                    reference.weekday(),
                )]))
            } else {
                Modifier::Weekdays(configured)
            }
        }
        Frequency::Monthly | Frequency::Yearly => Modifier::DayOfMonth {
            day: rule
                .day_of_month()
                .map_or_else(|| reference.day(), u32::from),
            month: (rule.frequency() == Frequency::Yearly).then(|| reference.month()),
            lookahead: rule.day_of_month().is_some(),
        },
        Frequency::Minutely | Frequency::Hourly | Frequency::Daily | Frequency::Custom => {
            Modifier::None
        }
    }
}
