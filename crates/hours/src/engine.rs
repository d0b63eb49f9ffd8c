//! Recurring weekly schedule engine.
//!
//! The facade never answers "open at T" or "next change after T" itself; it
//! compiles the canonical schedule into a compact string and asks a
//! [`ScheduleEngine`]. [`WeeklyCompiler`] is the built-in implementation.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use chrono_tz::Tz;

use oh_domain::error::Result;
use oh_domain::Weekday;

use crate::compact::{self, DayRanges};
use crate::tz::local_occurrences;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Engine traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A compiled weekly schedule that answers point-in-time queries.
pub trait ScheduleEngine: Send + Sync {
    /// Whether the schedule is open at `at`.
    fn is_open_at(&self, at: DateTime<Utc>) -> bool;

    /// First instant strictly after `at` where the open/closed state flips,
    /// or `None` if the state never changes.
    fn next_change_after(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// Builds a [`ScheduleEngine`] from a compact schedule string evaluated in
/// the given zone. Called after every mutation of the canonical schedule.
pub trait ScheduleCompiler: Send + Sync {
    fn compile(&self, schedule: &str, tz: Tz) -> Result<Box<dyn ScheduleEngine>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Built-in weekly engine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compiles compact strings into [`WeeklyEngine`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeeklyCompiler;

impl ScheduleCompiler for WeeklyCompiler {
    fn compile(&self, schedule: &str, tz: Tz) -> Result<Box<dyn ScheduleEngine>> {
        Ok(Box::new(WeeklyEngine::parse(schedule, tz)?))
    }
}

/// Days of look-ahead when searching for the next change. A week plus a
/// margin on both sides for zone offsets.
const SEARCH_DAYS: i64 = 8;

/// Weekly schedule evaluated on local wall-clock time in `tz`.
#[derive(Clone, Debug)]
pub struct WeeklyEngine {
    tz: Tz,
    days: DayRanges,
}

impl WeeklyEngine {
    pub fn parse(schedule: &str, tz: Tz) -> Result<Self> {
        let days = compact::parse(schedule)?;
        tracing::debug!(
            timezone = %tz,
            ranges = days.iter().map(Vec::len).sum::<usize>(),
            "compiled weekly schedule"
        );
        Ok(Self { tz, days })
    }

    /// Candidate transition instants strictly after `at`, in order.
    fn boundaries_after(&self, at: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let start = at.with_timezone(&self.tz).date_naive();
        let mut out = Vec::new();
        for offset in -1..=SEARCH_DAYS {
            let date = start + Duration::days(offset);
            let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
                continue;
            };
            let day = Weekday::from(date.weekday());
            for &(open, close) in &self.days[day.index()] {
                for minute in [open, close] {
                    let local = midnight + Duration::minutes(i64::from(minute));
                    out.extend(
                        local_occurrences(self.tz, local)
                            .into_iter()
                            .filter(|instant| *instant > at),
                    );
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl ScheduleEngine for WeeklyEngine {
    fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.tz);
        let day = Weekday::from(local.weekday());
        let minute = (local.hour() * 60 + local.minute()) as u16;
        self.days[day.index()]
            .iter()
            .any(|&(open, close)| minute >= open && minute < close)
    }

    fn next_change_after(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut state = self.is_open_at(at);
        for candidate in self.boundaries_after(at) {
            let next = self.is_open_at(candidate);
            if next != state {
                return Some(candidate);
            }
            state = next;
        }
        None
    }
}
