//! Builder pattern for constructing an [`OpeningHours`] service.

use chrono::NaiveDate;

use oh_domain::config::ServiceConfig;
use oh_domain::error::{Error, Result};
use oh_domain::OpeningHoursSpecification;

use crate::engine::{ScheduleCompiler, WeeklyCompiler};
use crate::normalize::{is_reference_monday, NormalizeOptions};
use crate::service::OpeningHours;
use crate::time_source::{SystemTimeSource, TimeSource};
use crate::tz::parse_tz;

/// Fluent builder for [`OpeningHours`].
///
/// # Example
///
/// ```rust
/// # use oh_hours::OpeningHoursBuilder;
/// # use oh_domain::OpeningHoursSpecification;
/// let hours = OpeningHoursBuilder::new()
///     .timezone("Europe/Berlin")
///     .hours(
///         vec![OpeningHoursSpecification::day("Monday", "09:00", "17:00")],
///         Some("UTC"),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(hours.total_open_hours(), 8.0);
/// ```
pub struct OpeningHoursBuilder {
    timezone: String,
    options: NormalizeOptions,
    compiler: Box<dyn ScheduleCompiler>,
    time_source: Box<dyn TimeSource>,
    seed: Vec<OpeningHoursSpecification>,
    seed_zone: Option<String>,
}

impl OpeningHoursBuilder {
    pub fn new() -> Self {
        Self {
            timezone: "UTC".into(),
            options: NormalizeOptions::default(),
            compiler: Box::new(WeeklyCompiler),
            time_source: Box::new(SystemTimeSource),
            seed: Vec::new(),
            seed_zone: None,
        }
    }

    /// Start from a [`ServiceConfig`] (zone, reference week, tolerance).
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new()
            .timezone(config.timezone.clone())
            .options(NormalizeOptions::from(config))
    }

    // ── Normalization ────────────────────────────────────────────────

    /// Internal zone the canonical schedule is kept in.
    pub fn timezone(mut self, zone: impl Into<String>) -> Self {
        self.timezone = zone.into();
        self
    }

    pub fn options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Monday of the week used to anchor zone conversions.
    pub fn reference_week(mut self, monday: NaiveDate) -> Self {
        self.options.reference_week = monday;
        self
    }

    pub fn adjacency_tolerance(mut self, minutes: u16) -> Self {
        self.options.adjacency_tolerance = minutes;
        self
    }

    // ── Collaborators ────────────────────────────────────────────────

    /// Replace the schedule engine compiler (defaults to [`WeeklyCompiler`]).
    pub fn compiler(mut self, compiler: Box<dyn ScheduleCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Replace the source of "now" (defaults to [`SystemTimeSource`]).
    pub fn time_source(mut self, source: Box<dyn TimeSource>) -> Self {
        self.time_source = source;
        self
    }

    // ── Seed data ────────────────────────────────────────────────────

    /// Initial opening hours, given in `zone` (internal zone when `None`).
    pub fn hours(mut self, specs: Vec<OpeningHoursSpecification>, zone: Option<&str>) -> Self {
        self.seed = specs;
        self.seed_zone = zone.map(str::to_string);
        self
    }

    /// Validate settings, normalize the seed hours and compile the engine.
    pub fn build(self) -> Result<OpeningHours> {
        let tz = parse_tz(&self.timezone)?;
        if !is_reference_monday(self.options.reference_week) {
            return Err(Error::Config(format!(
                "reference week {} does not start on a Monday",
                self.options.reference_week
            )));
        }

        let mut service = OpeningHours::assemble(tz, self.options, self.compiler, self.time_source)?;
        if !self.seed.is_empty() {
            service.set_opening_hours(&self.seed, self.seed_zone.as_deref())?;
        }
        Ok(service)
    }
}

impl Default for OpeningHoursBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_utc_and_empty() {
        let hours = OpeningHoursBuilder::new().build().unwrap();
        assert_eq!(hours.timezone_name(), "UTC");
        assert_eq!(hours.total_open_hours(), 0.0);
    }

    #[test]
    fn rejects_unknown_zone() {
        let err = OpeningHoursBuilder::new().timezone("Nope/Nowhere").build().err().unwrap();
        assert!(matches!(err, Error::InvalidTimeValue(_)));
    }

    #[test]
    fn rejects_non_monday_reference_week() {
        let err = OpeningHoursBuilder::new()
            .reference_week(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn seed_errors_abort_construction() {
        let result = OpeningHoursBuilder::new()
            .hours(vec![OpeningHoursSpecification::day("Monday", "18:00", "09:00")], None)
            .build();
        assert!(matches!(result, Err(Error::InvalidTimeRange { .. })));
    }

    #[test]
    fn from_config_carries_settings() {
        let config = ServiceConfig {
            timezone: "Asia/Tokyo".into(),
            reference_week: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            adjacency_tolerance_minutes: 0,
        };
        let hours = OpeningHoursBuilder::from_config(&config).build().unwrap();
        assert_eq!(hours.timezone_name(), "Asia/Tokyo");
        assert_eq!(hours.options().adjacency_tolerance, 0);
        assert_eq!(hours.options().reference_week, config.reference_week);
    }
}
