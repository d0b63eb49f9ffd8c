//! `OpeningHours`: canonical weekly schedule store and query facade.
//!
//! The canonical schedule is kept in one internal zone. Every mutation runs
//! the normalizer, builds the replacement set and recompiles the engine
//! before swapping anything in, so a failed call leaves the previous state
//! untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use oh_domain::config::ServiceConfig;
use oh_domain::error::Result;
use oh_domain::{Interval, OpenRange, OpenRangePerDay, OpeningHoursSpecification, Weekday};

use crate::builder::OpeningHoursBuilder;
use crate::compact;
use crate::engine::{ScheduleCompiler, ScheduleEngine};
use crate::normalize::{self, bucket_by_day, reproject, sort_merge_check, NormalizeOptions};
use crate::time_source::TimeSource;
use crate::tz::{format_instant, parse_tz};

/// Minutes in a week; the cap for "minutes until" queries when the schedule
/// never changes state.
pub const MINUTES_PER_WEEK: i64 = 7 * 24 * 60;

/// Upper bound on successive next-change lookups when searching for a
/// specific transition direction.
const MAX_TRANSITION_WALK: usize = 32;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Next change
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// State entered at a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeState {
    Open,
    Close,
}

/// The next open/close transition after some instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextChange {
    pub date: DateTime<Utc>,
    pub state: ChangeState,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Weekly opening hours held in a single internal timezone.
///
/// Not internally synchronized: reads take `&self`, mutations `&mut self`.
/// Wrap in a mutex to share across threads.
pub struct OpeningHours {
    timezone: Tz,
    options: NormalizeOptions,
    intervals: Vec<Interval>,
    compact: String,
    compiler: Box<dyn ScheduleCompiler>,
    engine: Box<dyn ScheduleEngine>,
    time_source: Box<dyn TimeSource>,
}

impl fmt::Debug for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpeningHours")
            .field("timezone", &self.timezone)
            .field("options", &self.options)
            .field("schedule", &self.compact)
            .finish_non_exhaustive()
    }
}

impl OpeningHours {
    /// Empty (always closed) schedule stored in `zone`.
    pub fn new(zone: &str) -> Result<Self> {
        OpeningHoursBuilder::new().timezone(zone).build()
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        OpeningHoursBuilder::from_config(config).build()
    }

    pub fn builder() -> OpeningHoursBuilder {
        OpeningHoursBuilder::new()
    }

    pub(crate) fn assemble(
        timezone: Tz,
        options: NormalizeOptions,
        compiler: Box<dyn ScheduleCompiler>,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self> {
        let compact = compact::build(&[]);
        let engine = compiler.compile(&compact, timezone)?;
        Ok(Self {
            timezone,
            options,
            intervals: Vec::new(),
            compact,
            compiler,
            engine,
            time_source,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn timezone_name(&self) -> &'static str {
        self.timezone.name()
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// Canonical intervals in the internal zone, sorted Monday first.
    pub fn canonical(&self) -> &[Interval] {
        &self.intervals
    }

    /// The compact string last handed to the schedule engine.
    pub fn compact_schedule(&self) -> &str {
        &self.compact
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the whole schedule with `specs`, given in `zone` (internal
    /// zone when `None`).
    pub fn set_opening_hours(
        &mut self,
        specs: &[OpeningHoursSpecification],
        zone: Option<&str>,
    ) -> Result<()> {
        let plan = self
            .zone_or_internal(zone)
            .and_then(|from| normalize::normalize_tz(specs, from, self.timezone, self.options))
            .map(|intervals| (self.timezone, intervals));
        self.apply("set_opening_hours", plan)
    }

    /// Add a single range on `day`.
    pub fn add_opening_hour(
        &mut self,
        day: &str,
        opens: &str,
        closes: &str,
        zone: Option<&str>,
    ) -> Result<()> {
        self.add_opening_hours(&[OpeningHoursSpecification::day(day, opens, closes)], zone)
    }

    /// Add `specs` to the existing schedule. Overlap with existing ranges is
    /// an error; touching ranges are merged.
    pub fn add_opening_hours(
        &mut self,
        specs: &[OpeningHoursSpecification],
        zone: Option<&str>,
    ) -> Result<()> {
        let plan = self
            .zone_or_internal(zone)
            .and_then(|from| normalize::normalize_tz(specs, from, self.timezone, self.options))
            .and_then(|new| {
                let mut all = self.intervals.clone();
                all.extend(new);
                sort_merge_check(all, self.options.adjacency_tolerance)
            })
            .map(|intervals| (self.timezone, intervals));
        self.apply("add_opening_hours", plan)
    }

    /// Remove every range on `day`, where `day` is read in `zone` (internal
    /// zone when `None`).
    pub fn remove_opening_hours(&mut self, day: &str, zone: Option<&str>) -> Result<()> {
        let plan = self
            .remaining_without(day, zone)
            .map(|intervals| (self.timezone, intervals));
        self.apply("remove_opening_hours", plan)
    }

    fn remaining_without(&self, day: &str, zone: Option<&str>) -> Result<Vec<Interval>> {
        let weekday = Weekday::parse(day)?;
        let view_tz = self.zone_or_internal(zone)?;

        if view_tz == self.timezone {
            return Ok(self
                .intervals
                .iter()
                .copied()
                .filter(|i| i.weekday != weekday)
                .collect());
        }
        let viewed = reproject(&self.intervals, self.timezone, view_tz, self.options)?;
        let kept: Vec<Interval> = viewed.into_iter().filter(|i| i.weekday != weekday).collect();
        reproject(&kept, view_tz, self.timezone, self.options)
    }

    /// Rebase the canonical schedule into a new internal zone.
    pub fn set_timezone(&mut self, zone: &str) -> Result<()> {
        let plan = parse_tz(zone).and_then(|tz| {
            let rebased = reproject(&self.intervals, self.timezone, tz, self.options)?;
            Ok((tz, rebased))
        });
        if matches!(&plan, Ok((tz, _)) if *tz == self.timezone) {
            return Ok(());
        }
        self.apply("set_timezone", plan)
    }

    /// Drop all ranges (always closed).
    pub fn clear(&mut self) -> Result<()> {
        self.apply("clear", Ok((self.timezone, Vec::new())))
    }

    /// Commit a planned replacement; any failure, planned or from the
    /// engine, is logged and leaves the current state in place.
    fn apply(&mut self, operation: &'static str, plan: Result<(Tz, Vec<Interval>)>) -> Result<()> {
        plan.and_then(|(tz, intervals)| self.commit(tz, intervals))
            .inspect_err(|e| {
                tracing::warn!(operation, error = %e, "rejected opening hours mutation");
            })
    }

    /// Recompile the engine for `intervals` in `tz`, then swap state in.
    fn commit(&mut self, tz: Tz, intervals: Vec<Interval>) -> Result<()> {
        let compact = compact::build(&intervals);
        let engine = self.compiler.compile(&compact, tz)?;
        tracing::debug!(schedule = %compact, timezone = %tz, "schedule engine rebuilt");

        self.timezone = tz;
        self.intervals = intervals;
        self.compact = compact;
        self.engine = engine;

        tracing::info!(
            intervals = self.intervals.len(),
            timezone = %self.timezone,
            "opening hours updated"
        );
        Ok(())
    }

    fn zone_or_internal(&self, zone: Option<&str>) -> Result<Tz> {
        match zone {
            Some(z) => parse_tz(z),
            None => Ok(self.timezone),
        }
    }

    // ── Range views ──────────────────────────────────────────────────

    /// Canonical intervals reprojected into `zone` (internal when `None`).
    pub fn intervals(&self, zone: Option<&str>) -> Result<Vec<Interval>> {
        let to = self.zone_or_internal(zone)?;
        reproject(&self.intervals, self.timezone, to, self.options)
    }

    /// Export as records in `zone` (internal when `None`).
    pub fn opening_hours(&self, zone: Option<&str>) -> Result<Vec<OpeningHoursSpecification>> {
        Ok(self
            .intervals(zone)?
            .iter()
            .map(Interval::to_specification)
            .collect())
    }

    /// Seven per-day views, Monday first. Closed days have an empty range list.
    pub fn open_ranges_per_day(&self, zone: Option<&str>) -> Result<Vec<OpenRangePerDay>> {
        let days = bucket_by_day(&self.intervals(zone)?);
        Ok(Weekday::ALL
            .iter()
            .map(|day| {
                OpenRangePerDay::new(
                    *day,
                    days[day.index()].iter().map(Interval::to_open_range).collect(),
                )
            })
            .collect())
    }

    /// Open ranges of one weekday in `zone`; empty when closed all day.
    pub fn open_ranges_for_day(&self, day: &str, zone: Option<&str>) -> Result<Vec<OpenRange>> {
        let weekday = Weekday::parse(day)?;
        Ok(self
            .intervals(zone)?
            .iter()
            .filter(|i| i.weekday == weekday)
            .map(Interval::to_open_range)
            .collect())
    }

    // ── Aggregates ───────────────────────────────────────────────────

    /// Total open hours per week.
    pub fn total_open_hours(&self) -> f64 {
        let minutes: u32 = self.intervals.iter().map(Interval::duration_minutes).sum();
        f64::from(minutes) / 60.0
    }

    /// Weekdays (internal zone) without any open range, Monday first.
    pub fn days_without_opening_hours(&self) -> Vec<Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(|day| !self.intervals.iter().any(|i| i.weekday == *day))
            .collect()
    }

    // ── Validation probes ────────────────────────────────────────────

    /// Re-check the canonical schedule. Never fails; returns `false` instead.
    pub fn validate(&self) -> bool {
        sort_merge_check(self.intervals.clone(), self.options.adjacency_tolerance)
            .inspect_err(|e| tracing::debug!(error = %e, "canonical schedule failed validation"))
            .is_ok()
    }

    /// Check whether `specs` (in `zone`) would be accepted, without mutating.
    pub fn validate_candidates(&self, specs: &[OpeningHoursSpecification], zone: Option<&str>) -> bool {
        self.zone_or_internal(zone)
            .and_then(|from| normalize::normalize_tz(specs, from, self.timezone, self.options))
            .inspect_err(|e| tracing::debug!(error = %e, "candidate hours failed validation"))
            .is_ok()
    }

    // ── Point-in-time queries ────────────────────────────────────────

    pub fn now(&self) -> DateTime<Utc> {
        self.time_source.now()
    }

    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        self.engine.is_open_at(at)
    }

    pub fn is_open(&self) -> bool {
        self.is_open_at(self.now())
    }

    pub fn is_closed_at(&self, at: DateTime<Utc>) -> bool {
        !self.is_open_at(at)
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed_at(self.now())
    }

    /// Open at `at` and never closing afterwards.
    pub fn is_always_open_at(&self, at: DateTime<Utc>) -> bool {
        self.is_open_at(at) && self.engine.next_change_after(at).is_none()
    }

    pub fn is_always_open(&self) -> bool {
        self.is_always_open_at(self.now())
    }

    /// Closed at `at` and never opening afterwards.
    pub fn is_always_closed_at(&self, at: DateTime<Utc>) -> bool {
        self.is_closed_at(at) && self.engine.next_change_after(at).is_none()
    }

    pub fn is_always_closed(&self) -> bool {
        self.is_always_closed_at(self.now())
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub fn next_change_at(&self, at: DateTime<Utc>) -> Option<NextChange> {
        let date = self.engine.next_change_after(at)?;
        let state = if self.engine.is_open_at(date) {
            ChangeState::Open
        } else {
            ChangeState::Close
        };
        Some(NextChange { date, state })
    }

    pub fn next_change(&self) -> Option<NextChange> {
        self.next_change_at(self.now())
    }

    /// Next instant after `at` where the schedule opens.
    pub fn next_open_at(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.next_transition_into(at, ChangeState::Open)
    }

    /// Next instant after `at` where the schedule closes.
    pub fn next_close_at(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.next_transition_into(at, ChangeState::Close)
    }

    fn next_transition_into(&self, at: DateTime<Utc>, wanted: ChangeState) -> Option<DateTime<Utc>> {
        let mut cursor = at;
        for _ in 0..MAX_TRANSITION_WALK {
            let change = self.next_change_at(cursor)?;
            if change.state == wanted {
                return Some(change.date);
            }
            cursor = change.date;
        }
        None
    }

    /// Minutes from `at` to the next change of state, or
    /// [`MINUTES_PER_WEEK`] when there is none.
    pub fn minutes_until_next_change_at(&self, at: DateTime<Utc>) -> i64 {
        minutes_between(at, self.engine.next_change_after(at))
    }

    pub fn minutes_until_next_change(&self) -> i64 {
        self.minutes_until_next_change_at(self.now())
    }

    /// Minutes until the schedule opens; 0 when already open.
    pub fn minutes_until_open_at(&self, at: DateTime<Utc>) -> i64 {
        if self.is_open_at(at) {
            return 0;
        }
        minutes_between(at, self.next_open_at(at))
    }

    /// Minutes until the schedule closes; 0 when already closed.
    pub fn minutes_until_close_at(&self, at: DateTime<Utc>) -> i64 {
        if self.is_closed_at(at) {
            return 0;
        }
        minutes_between(at, self.next_close_at(at))
    }

    /// Open at `at` and staying open for at least `minutes`.
    pub fn is_open_for_at(&self, at: DateTime<Utc>, minutes: i64) -> bool {
        self.is_open_at(at) && self.minutes_until_next_change_at(at) >= minutes
    }

    pub fn is_open_for(&self, minutes: i64) -> bool {
        self.is_open_for_at(self.now(), minutes)
    }

    /// Closed at `at` and staying closed for at least `minutes`.
    pub fn is_closed_for_at(&self, at: DateTime<Utc>, minutes: i64) -> bool {
        self.is_closed_at(at) && self.minutes_until_next_change_at(at) >= minutes
    }

    pub fn is_closed_for(&self, minutes: i64) -> bool {
        self.is_closed_for_at(self.now(), minutes)
    }

    /// Format `instant` as wall-clock time in the internal zone.
    pub fn format_instant(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        format_instant(instant, self.timezone, pattern)
    }
}

fn minutes_between(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> i64 {
    match to {
        Some(to) => (to - from).num_minutes(),
        None => MINUTES_PER_WEEK,
    }
}
