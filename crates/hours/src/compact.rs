//! Compact weekly schedule string handed to the schedule engine.
//!
//! One clause per weekday, Monday first, joined by `"; "`:
//! `"Mo 09:00-12:00,14:00-17:00; Tu off; ..."`.

use oh_domain::error::{Error, Result};
use oh_domain::{ClockTime, Interval, Weekday};

use crate::normalize::bucket_by_day;

const CLOSED: &str = "off";

/// Per-day open ranges in minutes since midnight, `[open, close)`.
pub type DayRanges = [Vec<(u16, u16)>; 7];

/// Serialize canonical intervals into the compact string form.
pub fn build(intervals: &[Interval]) -> String {
    let days = bucket_by_day(intervals);
    Weekday::ALL
        .iter()
        .map(|day| {
            let ranges = &days[day.index()];
            if ranges.is_empty() {
                format!("{} {CLOSED}", day.code())
            } else {
                let joined = ranges
                    .iter()
                    .map(|r| format!("{}-{}", r.opens, r.closes))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{} {joined}", day.code())
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a compact string. Days without a clause are closed; a day may
/// appear only once.
pub fn parse(schedule: &str) -> Result<DayRanges> {
    let mut days: DayRanges = Default::default();
    let mut seen = [false; 7];

    for clause in schedule.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        let (code, body) = clause
            .split_once(char::is_whitespace)
            .ok_or_else(|| engine_err(format!("clause '{clause}' has no ranges")))?;
        let day = Weekday::from_code(code)
            .ok_or_else(|| engine_err(format!("unknown day code '{code}'")))?;
        if seen[day.index()] {
            return Err(engine_err(format!("day '{code}' appears twice")));
        }
        seen[day.index()] = true;

        let body = body.trim();
        if body == CLOSED {
            continue;
        }
        for range in body.split(',').map(str::trim) {
            let (open, close) = range
                .split_once('-')
                .ok_or_else(|| engine_err(format!("range '{range}' is not open-close")))?;
            let open = ClockTime::parse(open).map_err(|e| engine_err(e.to_string()))?;
            let close = ClockTime::parse(close).map_err(|e| engine_err(e.to_string()))?;
            if close <= open {
                return Err(engine_err(format!("range '{range}' closes before it opens")));
            }
            days[day.index()].push((open.minutes(), close.minutes()));
        }
        days[day.index()].sort_unstable();
    }
    Ok(days)
}

fn engine_err(message: String) -> Error {
    Error::Engine(message)
}
