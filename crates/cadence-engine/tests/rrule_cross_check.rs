//! Cross-checks against the `rrule` crate for rules whose semantics coincide
//! with RFC 5545 (daily, and weekly with weeks starting on Sunday).
//!
//! An RFC 5545 expansion includes DTSTART itself; our sequences start strictly
//! after the reference, so the first RFC instance is dropped before comparing.

use chrono::{DateTime, TimeZone, Utc};
use rrule::RRuleSet;
use cadence_engine::RecurrenceRule;

fn rfc_expand(rrule: &str, dtstart: &str, timezone: &str, count: u16) -> Vec<DateTime<Utc>> {
    let text = format!("DTSTART;TZID={}:{}\nRRULE:{}", timezone, dtstart, rrule);
    let set: RRuleSet = text.parse().expect("valid RRULE");
    set.all(count)
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .collect()
}

fn assert_agrees(rule: &RecurrenceRule, rrule: &str, dtstart: &str, timezone: &str) {
    let expected = rfc_expand(rrule, dtstart, timezone, 21);
    let start = expected[0];
    let ours = rule.occurrences(start, 20);
    assert_eq!(ours, expected[1..].to_vec(), "disagreement for {}", rrule);
}

#[test]
fn daily_matches_rfc() {
    let rule = RecurrenceRule::daily().with_time_zone("UTC");
    assert_agrees(&rule, "FREQ=DAILY", "20260301T090000", "UTC");
}

#[test]
fn every_third_day_matches_rfc() {
    let rule = RecurrenceRule::daily().with_interval(3).with_time_zone("UTC");
    assert_agrees(&rule, "FREQ=DAILY;INTERVAL=3", "20260225T090000", "UTC");
}

#[test]
fn daily_across_dst_matches_rfc() {
    let rule = RecurrenceRule::daily().with_time_zone("America/Los_Angeles");
    assert_agrees(
        &rule,
        "FREQ=DAILY",
        "20260301T090000",
        "America/Los_Angeles",
    );
}

#[test]
fn weekly_mon_wed_fri_matches_rfc() {
    let rule = RecurrenceRule::weekly([2, 4, 6]).with_time_zone("UTC");
    assert_agrees(
        &rule,
        "FREQ=WEEKLY;BYDAY=MO,WE,FR;WKST=SU",
        "20261005T090000",
        "UTC",
    );
}

#[test]
fn biweekly_tue_thu_matches_rfc() {
    let rule = RecurrenceRule::weekly([3, 5])
        .with_interval(2)
        .with_time_zone("UTC");
    assert_agrees(
        &rule,
        "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH;WKST=SU",
        "20260106T100000",
        "UTC",
    );
}

#[test]
fn weekend_rule_matches_rfc() {
    let rule = RecurrenceRule::weekly([1, 7]).with_time_zone("America/New_York");
    // 2026-10-10 is a Saturday
    assert_agrees(
        &rule,
        "FREQ=WEEKLY;BYDAY=SA,SU;WKST=SU",
        "20261010T083000",
        "America/New_York",
    );
}

#[test]
fn monthly_on_fixed_day_matches_rfc_when_day_exists_everywhere() {
    let rule = RecurrenceRule::monthly_on(15).with_time_zone("UTC");
    assert_agrees(&rule, "FREQ=MONTHLY;BYMONTHDAY=15", "20260115T120000", "UTC");
}

#[test]
fn rfc_sanity_first_instance_is_dtstart() {
    let expected = rfc_expand("FREQ=DAILY", "20260301T090000", "UTC", 2);
    assert_eq!(expected[0], Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
}
