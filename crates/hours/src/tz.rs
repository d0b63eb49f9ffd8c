//! IANA timezone helpers on top of `chrono-tz`.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use oh_domain::error::{Error, Result};

/// Longest DST gap we step over when resolving a nonexistent local time.
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// Parse an IANA zone name. Unknown names are an error, never a fallback.
pub fn parse_tz(zone: &str) -> Result<Tz> {
    zone.trim().parse::<Tz>().map_err(|_| {
        Error::InvalidTimeValue(format!(
            "unknown timezone '{zone}': use IANA names like 'America/New_York' or 'UTC'"
        ))
    })
}

/// Map a local wall-clock time in `tz` to an absolute instant.
///
/// **DST handling:**
/// - Fall-back overlaps: the earliest (pre-transition) mapping is chosen.
/// - Spring-forward gaps: the first valid local minute after the gap is used.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let mut candidate = local;
    for _ in 0..=MAX_GAP_MINUTES {
        match tz.from_local_datetime(&candidate) {
            chrono::LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
            chrono::LocalResult::Ambiguous(earliest, _) => {
                return Some(earliest.with_timezone(&Utc));
            }
            chrono::LocalResult::None => {}
        }
        candidate += Duration::minutes(1);
    }
    None
}

/// Every instant at which `local` is read on the wall clock in `tz`.
///
/// Fall-back overlaps yield both mappings, earliest first. A spring-forward
/// gap yields the single instant [`local_to_utc`] picks.
pub fn local_occurrences(tz: Tz, local: NaiveDateTime) -> Vec<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        chrono::LocalResult::Single(dt) => vec![dt.with_timezone(&Utc)],
        chrono::LocalResult::Ambiguous(earliest, latest) => {
            vec![earliest.with_timezone(&Utc), latest.with_timezone(&Utc)]
        }
        chrono::LocalResult::None => local_to_utc(tz, local).into_iter().collect(),
    }
}

/// Wall-clock reading of `instant` in `tz`.
pub fn utc_to_local(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Format `instant` as seen in `tz` using a `strftime` pattern.
pub fn format_instant(instant: DateTime<Utc>, tz: Tz, pattern: &str) -> String {
    instant.with_timezone(&tz).format(pattern).to_string()
}
