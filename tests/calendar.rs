use assert_matches::assert_matches;
use chrono::NaiveDate;

use archive_mirror::calendar::{DateRange, EndDateClamp, iterate, parse_date};
use archive_mirror::error::MirrorError;

fn day(value: &str) -> NaiveDate {
    parse_date(value).unwrap()
}

#[test]
fn iterate_is_inclusive_on_both_ends() {
    let days: Vec<_> = iterate(day("2020-01-01"), day("2020-01-03")).collect();
    assert_eq!(
        days,
        vec![day("2020-01-01"), day("2020-01-02"), day("2020-01-03")]
    );
}

#[test]
fn iterate_crosses_leap_day() {
    let days: Vec<_> = iterate(day("2020-02-27"), day("2020-03-01")).collect();
    assert_eq!(
        days,
        vec![
            day("2020-02-27"),
            day("2020-02-28"),
            day("2020-02-29"),
            day("2020-03-01"),
        ]
    );
}

#[test]
fn iterate_skips_leap_day_in_common_year() {
    let days: Vec<_> = iterate(day("2021-02-27"), day("2021-03-01")).collect();
    assert_eq!(
        days,
        vec![day("2021-02-27"), day("2021-02-28"), day("2021-03-01")]
    );
}

#[test]
fn iteration_restarts_from_scratch() {
    let range = DateRange::new(day("2020-01-30"), day("2020-02-02")).unwrap();
    let first: Vec<_> = range.days().collect();
    let second: Vec<_> = range.days().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn future_end_is_clamped_with_warning() {
    let today = day("2024-06-15");
    let resolved = DateRange::resolve("2024-06-10", Some("2030-01-01"), today).unwrap();
    assert_eq!(resolved.range.end(), today);
    assert_eq!(
        resolved.clamp,
        Some(EndDateClamp {
            configured: day("2030-01-01"),
            effective: today,
        })
    );
}

#[test]
fn missing_end_defaults_to_today_without_warning() {
    let today = day("2024-06-15");
    let resolved = DateRange::resolve("2024-06-14", None, today).unwrap();
    assert_eq!(resolved.range.start(), day("2024-06-14"));
    assert_eq!(resolved.range.end(), today);
    assert_eq!(resolved.clamp, None);
}

#[test]
fn past_end_is_kept() {
    let resolved = DateRange::resolve("2020-01-01", Some("2020-01-03"), day("2024-06-15")).unwrap();
    assert_eq!(resolved.range.end(), day("2020-01-03"));
    assert_eq!(resolved.clamp, None);
}

#[test]
fn unparsable_dates_are_rejected() {
    let today = day("2024-06-15");
    assert_matches!(
        DateRange::resolve("2024-06-10", Some("2024-13-01"), today),
        Err(MirrorError::InvalidDate(_))
    );
    assert_matches!(
        DateRange::resolve("15/06/2024", None, today),
        Err(MirrorError::InvalidDate(_))
    );
}

#[test]
fn start_after_effective_end_is_rejected() {
    let err = DateRange::resolve("2024-06-20", None, day("2024-06-15")).unwrap_err();
    assert_matches!(err, MirrorError::InvalidRange { .. });
}
