//! End-to-end behaviour of the opening hours service: ingestion in one zone,
//! export in another, engine-backed queries.
//!
//! All tests are pure and deterministic (fixed reference weeks and instants).

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use oh_domain::{ClockTime, Error, Interval, OpeningHoursSpecification, Weekday};
use oh_hours::normalize::reproject;
use oh_hours::tz::parse_tz;
use oh_hours::{NormalizeOptions, OpeningHours};

fn spec(day: &str, opens: &str, closes: &str) -> OpeningHoursSpecification {
    OpeningHoursSpecification::day(day, opens, closes)
}

fn iv(day: Weekday, opens: &str, closes: &str) -> Interval {
    Interval::new(
        day,
        ClockTime::parse(opens).unwrap(),
        ClockTime::parse(closes).unwrap(),
    )
}

fn winter_week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Concrete scenarios
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn mixed_zone_additions_stay_separate() {
    // New York is on daylight time (UTC-4) in the default reference week.
    let mut hours = OpeningHours::new("UTC").unwrap();
    hours.add_opening_hour("Monday", "09:00", "12:00", Some("UTC")).unwrap();
    hours
        .add_opening_hour("Monday", "14:00", "17:00", Some("America/New_York"))
        .unwrap();

    let exported = hours.opening_hours(Some("UTC")).unwrap();
    assert_eq!(
        exported,
        vec![spec("Monday", "09:00", "12:00"), spec("Monday", "18:00", "21:00")]
    );
}

#[test]
fn winter_reference_week_uses_standard_time() {
    let mut hours = OpeningHours::builder()
        .timezone("UTC")
        .reference_week(winter_week())
        .build()
        .unwrap();
    hours
        .add_opening_hour("Monday", "14:00", "17:00", Some("America/New_York"))
        .unwrap();
    assert_eq!(
        hours.opening_hours(None).unwrap(),
        vec![spec("Monday", "19:00", "22:00")]
    );
}

#[test]
fn sunday_until_midnight_exports_unchanged() {
    let mut hours = OpeningHours::new("UTC").unwrap();
    hours
        .set_opening_hours(&[spec("Sunday", "10:00", "24:00")], Some("UTC"))
        .unwrap();
    assert_eq!(
        hours.opening_hours(Some("UTC")).unwrap(),
        vec![spec("Sunday", "10:00", "24:00")]
    );
}

#[test]
fn direct_midnight_crossing_is_rejected() {
    let mut hours = OpeningHours::new("UTC").unwrap();
    let err = hours
        .add_opening_hour("Monday", "23:00", "02:00", Some("UTC"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTimeRange { .. }));
    assert!(hours.canonical().is_empty());
}

#[test]
fn empty_schedule_reports_everything_closed() {
    let hours = OpeningHours::new("UTC").unwrap();
    let closed: Vec<&str> = hours
        .days_without_opening_hours()
        .iter()
        .map(|d| d.name())
        .collect();
    assert_eq!(
        closed,
        vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
    );
    assert_eq!(hours.total_open_hours(), 0.0);
    assert_eq!(hours.next_change_at(utc(2024, 6, 3, 12, 0, 0)), None);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Properties
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn round_trip_between_zones_is_identity() {
    let canonical = vec![
        iv(Weekday::Monday, "00:00", "03:00"),
        iv(Weekday::Monday, "09:00", "17:30"),
        iv(Weekday::Wednesday, "12:00", "24:00"),
        iv(Weekday::Friday, "22:00", "24:00"),
        iv(Weekday::Sunday, "06:00", "23:00"),
    ];
    let opts = NormalizeOptions::default();
    let utc_tz = parse_tz("UTC").unwrap();
    for zone in ["America/Los_Angeles", "Asia/Kolkata", "Pacific/Auckland", "Europe/London"] {
        let other = parse_tz(zone).unwrap();
        let there = reproject(&canonical, utc_tz, other, opts).unwrap();
        let back = reproject(&there, other, utc_tz, opts).unwrap();
        assert_eq!(back, canonical, "round trip through {zone}");
    }
}

#[test]
fn export_of_export_is_stable() {
    let mut hours = OpeningHours::new("Europe/Berlin").unwrap();
    hours
        .set_opening_hours(
            &[
                spec("Monday", "08:00", "12:00"),
                spec("Monday", "12:01", "16:00"),
                spec("Saturday", "21:00", "24:00"),
            ],
            Some("America/Sao_Paulo"),
        )
        .unwrap();
    let first = hours.opening_hours(None).unwrap();

    let mut again = OpeningHours::new("Europe/Berlin").unwrap();
    again.set_opening_hours(&first, None).unwrap();
    assert_eq!(again.opening_hours(None).unwrap(), first);
}

#[test]
fn overlap_between_batches_is_never_silent() {
    let mut hours = OpeningHours::new("UTC").unwrap();
    hours.add_opening_hour("Tuesday", "10:00", "14:00", None).unwrap();

    // 09:00-12:00 in London (BST) is 08:00-11:00 UTC and intersects 10:00-14:00.
    let err = hours
        .add_opening_hour("Tuesday", "09:00", "12:00", Some("Europe/London"))
        .unwrap_err();
    match err {
        Error::Overlap { first, second } => {
            assert_eq!(first, iv(Weekday::Tuesday, "08:00", "11:00"));
            assert_eq!(second, iv(Weekday::Tuesday, "10:00", "14:00"));
            let message = Error::Overlap { first, second }.to_string();
            assert!(message.contains("Tuesday 08:00-11:00"));
            assert!(message.contains("Tuesday 10:00-14:00"));
        }
        other => panic!("expected overlap, got {other:?}"),
    }
    assert_eq!(hours.canonical(), &[iv(Weekday::Tuesday, "10:00", "14:00")]);
}

#[test]
fn end_of_day_is_open_until_the_last_minute() {
    let mut hours = OpeningHours::new("UTC").unwrap();
    hours.add_opening_hour("Monday", "09:00", "24:00", None).unwrap();
    assert_eq!(
        hours.opening_hours(None).unwrap(),
        vec![spec("Monday", "09:00", "24:00")]
    );

    assert!(hours.is_open_at(utc(2024, 6, 3, 23, 59, 0)));
    assert!(hours.is_open_at(utc(2024, 6, 3, 23, 59, 59)));
    assert!(!hours.is_open_at(utc(2024, 6, 4, 0, 0, 0)));
}

#[test]
fn total_hours_do_not_depend_on_input_zone() {
    let records = [
        spec("Monday", "09:00", "12:00"),
        spec("Tuesday", "13:30", "18:00"),
        spec("Thursday", "08:15", "11:45"),
    ];
    let mut totals = Vec::new();
    for zone in ["UTC", "America/Denver", "Asia/Singapore", "Australia/Adelaide"] {
        let mut hours = OpeningHours::new("UTC").unwrap();
        hours.set_opening_hours(&records, Some(zone)).unwrap();
        let bucket_sum: u32 = hours
            .open_ranges_per_day(None)
            .unwrap()
            .iter()
            .flat_map(|d| d.open_range.iter())
            .map(|r| u32::from(r.closes.minutes() - r.open.minutes()))
            .sum();
        assert_eq!(f64::from(bucket_sum) / 60.0, hours.total_open_hours());
        totals.push(hours.total_open_hours());
    }
    assert!(totals.iter().all(|t| (*t - 11.0).abs() < f64::EPSILON));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Engine-backed queries across zones
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn late_shift_split_across_midnight_reads_as_one_opening() {
    let mut hours = OpeningHours::new("Asia/Tokyo").unwrap();
    // 10:00-20:00 UTC on Friday is Friday 19:00 to Saturday 05:00 in Tokyo.
    hours
        .set_opening_hours(&[spec("Friday", "10:00", "20:00")], Some("UTC"))
        .unwrap();
    assert_eq!(
        hours.canonical(),
        &[
            iv(Weekday::Friday, "19:00", "24:00"),
            iv(Weekday::Saturday, "00:00", "05:00"),
        ]
    );

    let friday_noon_utc = utc(2024, 6, 7, 12, 0, 0);
    assert!(hours.is_open_at(friday_noon_utc));
    assert_eq!(hours.next_close_at(friday_noon_utc), Some(utc(2024, 6, 7, 20, 0, 0)));
    assert_eq!(hours.minutes_until_close_at(friday_noon_utc), 8 * 60);
}

#[test]
fn records_round_trip_through_json() {
    let input = serde_json::json!([
        { "@type": "OpeningHoursSpecification", "dayOfWeek": ["Monday", "Tuesday"], "opens": "09:00", "closes": "17:00" },
        { "@type": "OpeningHoursSpecification", "dayOfWeek": "https://schema.org/Saturday", "opens": "10:00", "closes": "14:00" }
    ]);
    let records: Vec<OpeningHoursSpecification> = serde_json::from_value(input).unwrap();

    let mut hours = OpeningHours::new("UTC").unwrap();
    hours.set_opening_hours(&records, None).unwrap();
    assert_eq!(hours.total_open_hours(), 20.0);

    let out = serde_json::to_value(hours.opening_hours(None).unwrap()).unwrap();
    assert_eq!(out.as_array().unwrap().len(), 3);
    assert_eq!(out[2]["dayOfWeek"], "Saturday");
    assert_eq!(out[2]["@type"], "OpeningHoursSpecification");
}
