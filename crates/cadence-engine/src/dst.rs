//! DST transition policies for mapping local wall-clock times to instants.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for occurrences whose wall-clock time falls in a DST gap.
///
/// Ambiguous wall times (the repeated hour when clocks fall back) always
/// resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Move the wall time forward by the length of the gap (02:30 becomes 03:30
    /// on a spring-forward night).
    #[default]
    ShiftForward,
    /// The wall time is not an occurrence; calculation moves on to the next
    /// candidate.
    Skip,
}

impl DstPolicy {
    /// Map a local wall-clock time in `tz` to an instant, or `None` if the
    /// policy drops it.
    pub fn resolve(self, tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => match self {
                DstPolicy::Skip => None,
                DstPolicy::ShiftForward => shift_past_gap(tz, local),
            },
        }
    }
}

/// Interpret a wall time inside a gap with the offset in force before the
/// transition. Converting that instant back yields the shifted wall time.
fn shift_past_gap(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    let probe = local.checked_sub_signed(Duration::days(1))?;
    let before = tz.offset_from_local_datetime(&probe).earliest()?;
    let offset = Duration::seconds(i64::from(before.fix().local_minus_utc()));
    let utc = local.checked_sub_signed(offset)?;
    Some(tz.from_utc_datetime(&utc))
}
