//! Schedule normalizer: expand, validate, convert between zones, split at
//! midnight, merge adjacent ranges and check integrity.
//!
//! Every entry point is all-or-nothing: the first offending candidate aborts
//! the whole batch.
//!
//! Day boundaries use the `24:00`/`00:00` convention: a range that crosses
//! local midnight becomes `[opens, 24:00]` on the first day and
//! `[00:00, closes]` on the next.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

use oh_domain::config::{d_reference_week, ServiceConfig};
use oh_domain::error::{Error, Result};
use oh_domain::{ClockTime, Interval, OpeningHoursSpecification, Weekday, MINUTES_PER_DAY};

use crate::tz::{local_to_utc, parse_tz, utc_to_local};

/// Knobs shared by every normalizer entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Monday of the week that weekday wall-clock times are anchored to.
    pub reference_week: NaiveDate,
    /// Same-day gaps up to this many minutes are merged.
    pub adjacency_tolerance: u16,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            reference_week: d_reference_week(),
            adjacency_tolerance: 1,
        }
    }
}

impl From<&ServiceConfig> for NormalizeOptions {
    fn from(cfg: &ServiceConfig) -> Self {
        Self {
            reference_week: cfg.reference_week,
            adjacency_tolerance: cfg.adjacency_tolerance_minutes,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Full pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Turn raw records given in `from_zone` into canonical intervals in `to_zone`.
pub fn normalize(
    specs: &[OpeningHoursSpecification],
    from_zone: &str,
    to_zone: &str,
    options: NormalizeOptions,
) -> Result<Vec<Interval>> {
    let from = parse_tz(from_zone)?;
    let to = parse_tz(to_zone)?;
    normalize_tz(specs, from, to, options)
}

/// [`normalize`] with already-resolved zones.
pub fn normalize_tz(
    specs: &[OpeningHoursSpecification],
    from: Tz,
    to: Tz,
    options: NormalizeOptions,
) -> Result<Vec<Interval>> {
    let candidates = expand(specs)?;
    let out = reproject(&candidates, from, to, options)?;
    tracing::debug!(
        records = specs.len(),
        candidates = candidates.len(),
        intervals = out.len(),
        from = %from,
        to = %to,
        "normalized opening hours"
    );
    Ok(out)
}

/// Convert already-validated intervals between zones, then sort, merge and
/// check them.
pub fn reproject(
    intervals: &[Interval],
    from: Tz,
    to: Tz,
    options: NormalizeOptions,
) -> Result<Vec<Interval>> {
    let converted = convert(intervals, from, to, options.reference_week)?;
    sort_merge_check(converted, options.adjacency_tolerance)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Expand + validate shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One interval per (record, weekday), with times parsed and ranges checked.
pub fn expand(specs: &[OpeningHoursSpecification]) -> Result<Vec<Interval>> {
    let mut out = Vec::with_capacity(specs.len());
    for spec in specs {
        for token in spec.day_of_week.tokens() {
            out.push(parse_candidate(token, &spec.opens, &spec.closes)?);
        }
    }
    Ok(out)
}

/// Parse a single weekday/opens/closes triple into a valid interval.
pub fn parse_candidate(day: &str, opens: &str, closes: &str) -> Result<Interval> {
    let weekday = Weekday::parse(day)?;
    let opens = ClockTime::parse(opens)?;
    let closes = ClockTime::parse(closes)?;
    if closes <= opens {
        return Err(Error::InvalidTimeRange {
            day: weekday,
            opens,
            closes,
        });
    }
    Ok(Interval::new(weekday, opens, closes))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Zone conversion + midnight split
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An endpoint after reprojection: days relative to the source weekday and
/// the wall-clock time on that day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Endpoint {
    day_offset: i64,
    time: ClockTime,
}

/// Reproject every interval's endpoints and split any range that now
/// crosses midnight. Output is unsorted and unmerged.
pub fn convert(
    intervals: &[Interval],
    from: Tz,
    to: Tz,
    reference_week: NaiveDate,
) -> Result<Vec<Interval>> {
    if from == to {
        return Ok(intervals.to_vec());
    }

    let mut out = Vec::with_capacity(intervals.len() + 2);
    for interval in intervals {
        let opens = project_endpoint(interval.weekday, interval.opens, false, from, to, reference_week)?;
        let closes = project_endpoint(interval.weekday, interval.closes, true, from, to, reference_week)?;

        let opens_day = interval.weekday.shift(opens.day_offset);
        let closes_day = interval.weekday.shift(closes.day_offset);

        if opens.day_offset == closes.day_offset {
            out.push(Interval::new(opens_day, opens.time, closes.time));
            continue;
        }

        // Crosses midnight in the target zone. Opens never projects to 24:00
        // and closes never to 00:00, so neither piece is empty.
        out.push(Interval::new(opens_day, opens.time, ClockTime::END_OF_DAY));
        out.push(Interval::new(closes_day, ClockTime::MIDNIGHT, closes.time));
    }
    Ok(out)
}

fn project_endpoint(
    weekday: Weekday,
    time: ClockTime,
    is_close: bool,
    from: Tz,
    to: Tz,
    reference_week: NaiveDate,
) -> Result<Endpoint> {
    let anchor = reference_week + Duration::days(weekday.index() as i64);

    // 24:00 is anchored as 00:00 of the following day.
    let local = match time.to_naive() {
        Some(t) => anchor.and_time(t),
        None => (anchor + Duration::days(1)).and_time(NaiveTime::MIN),
    };

    let instant = local_to_utc(from, local).ok_or_else(|| {
        Error::InvalidTimeValue(format!("{weekday} {time} cannot be resolved in {from}"))
    })?;
    let projected = utc_to_local(instant, to);

    let mut day_offset = (projected.date() - anchor).num_days();
    let mut minutes = (projected.hour() * 60 + projected.minute()) as u16;

    // A closing time at exactly midnight belongs to the day before, as 24:00.
    if is_close && minutes == 0 {
        day_offset -= 1;
        minutes = MINUTES_PER_DAY;
    }

    let time = ClockTime::from_minutes(minutes).ok_or_else(|| {
        Error::InvalidTimeValue(format!("{minutes} minutes is outside a day"))
    })?;
    Ok(Endpoint { day_offset, time })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sort, merge, integrity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sort by weekday then opening time, merge adjacent same-day ranges and
/// reject anything left malformed or overlapping.
pub fn sort_merge_check(mut intervals: Vec<Interval>, tolerance: u16) -> Result<Vec<Interval>> {
    intervals.sort_by_key(|i| (i.weekday, i.opens, i.closes));
    let merged = merge_adjacent(intervals, tolerance);
    check_integrity(&merged)?;
    Ok(merged)
}

/// Merge consecutive same-day intervals whose gap is `0..=tolerance` minutes.
/// Expects input sorted by weekday and opening time. Overlaps are left
/// untouched for [`check_integrity`] to report.
pub fn merge_adjacent(sorted: Vec<Interval>, tolerance: u16) -> Vec<Interval> {
    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            let touches = last.weekday == interval.weekday
                && interval.opens >= last.closes
                && interval.opens.minutes() - last.closes.minutes() <= tolerance;
            if touches {
                last.closes = last.closes.max(interval.closes);
                continue;
            }
        }
        merged.push(interval);
    }
    merged
}

/// Validate a sorted, merged list.
pub fn check_integrity(sorted: &[Interval]) -> Result<()> {
    for interval in sorted {
        if interval.opens.is_end_of_day() || interval.closes <= interval.opens {
            return Err(Error::InvalidTimeRange {
                day: interval.weekday,
                opens: interval.opens,
                closes: interval.closes,
            });
        }
    }
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.weekday == b.weekday && a.closes > b.opens {
            return Err(Error::Overlap { first: a, second: b });
        }
    }
    Ok(())
}

/// Group intervals into seven per-day lists, Monday first.
pub fn bucket_by_day(intervals: &[Interval]) -> [Vec<Interval>; 7] {
    let mut days: [Vec<Interval>; 7] = Default::default();
    for interval in intervals {
        days[interval.weekday.index()].push(*interval);
    }
    days
}

/// Check that `date` can serve as a reference week start.
pub fn is_reference_monday(date: NaiveDate) -> bool {
    date.weekday() == chrono::Weekday::Mon
}
