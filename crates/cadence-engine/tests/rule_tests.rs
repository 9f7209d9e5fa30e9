//! Validation and serialization of recurrence rules.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use cadence_engine::{CadenceError, EngineOptions, Frequency, RecurrenceRule, RepeatMode};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn factory_rules_are_valid() {
    for rule in [
        RecurrenceRule::minutely(),
        RecurrenceRule::hourly(),
        RecurrenceRule::daily(),
        RecurrenceRule::weekly([2, 4, 6]),
        RecurrenceRule::weekly([]),
        RecurrenceRule::monthly(),
        RecurrenceRule::monthly_on(31),
        RecurrenceRule::yearly(),
        RecurrenceRule::yearly_on(29),
    ] {
        assert!(rule.is_valid(), "{} should be valid", rule.describe());
        assert_eq!(rule.interval(), 1);
    }
}

#[test]
fn try_new_rejects_interval_below_one() {
    assert!(matches!(
        RecurrenceRule::try_new(Frequency::Daily, 0),
        Err(CadenceError::InvalidInterval(0))
    ));
    assert!(matches!(
        RecurrenceRule::try_new(Frequency::Weekly, -3),
        Err(CadenceError::InvalidInterval(-3))
    ));

    let rule = RecurrenceRule::try_new(Frequency::Monthly, 2).unwrap();
    assert_eq!(rule.interval(), 2);
    // The lenient constructor still clamps.
    assert_eq!(RecurrenceRule::new(Frequency::Daily, 0).interval(), 1);
}

#[test]
fn weekday_out_of_range_is_invalid() {
    let rule = RecurrenceRule::weekly([2, 8]);
    assert!(matches!(rule.validate(), Err(CadenceError::InvalidWeekday(8))));

    let zero = RecurrenceRule::weekly([0]);
    assert!(matches!(zero.validate(), Err(CadenceError::InvalidWeekday(0))));
}

#[test]
fn empty_weekday_set_is_invalid() {
    let rule = RecurrenceRule::weekly([]).with_days_of_week(Some(BTreeSet::new()));
    assert!(matches!(rule.validate(), Err(CadenceError::EmptyWeekdays)));
}

#[test]
fn day_of_month_out_of_range_is_invalid() {
    assert!(matches!(
        RecurrenceRule::monthly_on(35).validate(),
        Err(CadenceError::InvalidDayOfMonth(35))
    ));
    assert!(matches!(
        RecurrenceRule::monthly_on(0).validate(),
        Err(CadenceError::InvalidDayOfMonth(0))
    ));
    assert!(RecurrenceRule::monthly_on(31).is_valid());
}

#[test]
fn custom_frequency_is_invalid() {
    let rule = RecurrenceRule::new(Frequency::Custom, 1);
    assert!(matches!(
        rule.validate(),
        Err(CadenceError::UnsupportedFrequency(_))
    ));
}

#[test]
fn unknown_timezone_only_fails_strict_validation() {
    let rule = RecurrenceRule::daily().with_time_zone("Mars/Olympus_Mons");
    assert!(rule.is_valid());

    let strict = EngineOptions {
        strict_timezones: true,
        ..EngineOptions::default()
    };
    assert!(matches!(
        rule.validate_with(&strict),
        Err(CadenceError::InvalidTimezone(_))
    ));
    assert!(RecurrenceRule::daily()
        .with_time_zone("Europe/London")
        .validate_with(&strict)
        .is_ok());
}

// ---------------------------------------------------------------------------
// Serialization record
// ---------------------------------------------------------------------------

#[test]
fn serializes_camel_case_record() {
    let rule = RecurrenceRule::weekly([6, 2, 4])
        .with_interval(2)
        .with_end_date(Some(Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap()))
        .with_repeat_mode(RepeatMode::FromCompletionDate)
        .with_time_zone("America/Los_Angeles");

    let value: serde_json::Value = serde_json::from_str(&rule.to_json().unwrap()).unwrap();
    assert_eq!(value["frequency"], "weekly");
    assert_eq!(value["interval"], 2);
    assert_eq!(value["daysOfWeek"], serde_json::json!([2, 4, 6]));
    assert_eq!(value["endDate"], "2026-12-31T00:00:00Z");
    assert_eq!(value["repeatMode"], "fromCompletionDate");
    assert_eq!(value["timeZoneIdentifier"], "America/Los_Angeles");
    assert!(value["id"].is_string());
    assert!(value.get("dayOfMonth").is_none());
}

#[test]
fn decodes_minimal_record_with_defaults() {
    let rule = RecurrenceRule::from_json(r#"{"frequency":"daily","timeZoneIdentifier":"UTC"}"#)
        .unwrap();
    assert_eq!(rule.frequency(), Frequency::Daily);
    assert_eq!(rule.interval(), 1);
    assert_eq!(rule.repeat_mode(), RepeatMode::FromOriginalDate);
    assert_eq!(rule.end_date(), None);
}

#[test]
fn decoding_clamps_interval() {
    let rule = RecurrenceRule::from_json(
        r#"{"frequency":"monthly","interval":-3,"dayOfMonth":31,"timeZoneIdentifier":"UTC"}"#,
    )
    .unwrap();
    assert_eq!(rule.interval(), 1);
    assert_eq!(rule.day_of_month(), Some(31));
}

#[test]
fn decoded_rule_equals_original() {
    let rule = RecurrenceRule::monthly_on(15)
        .with_interval(3)
        .with_time_zone("Asia/Tokyo");
    let back = RecurrenceRule::from_json(&rule.to_json().unwrap()).unwrap();
    assert_eq!(back, rule);
}

#[test]
fn unknown_frequency_tag_is_rejected() {
    let err = RecurrenceRule::from_json(r#"{"frequency":"fortnightly"}"#).unwrap_err();
    assert!(matches!(err, CadenceError::Json(_)));
}
