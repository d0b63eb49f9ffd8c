//! Interval model and the external record shapes built from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::weekday::Weekday;

pub const OPENING_HOURS_SPECIFICATION: &str = "OpeningHoursSpecification";
pub const OPEN_RANGE_PER_DAY: &str = "OpenRangePerDay";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Canonical interval
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single open range on one weekday. `closes` may be `24:00`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    pub weekday: Weekday,
    pub opens: ClockTime,
    pub closes: ClockTime,
}

impl Interval {
    pub fn new(weekday: Weekday, opens: ClockTime, closes: ClockTime) -> Self {
        Self {
            weekday,
            opens,
            closes,
        }
    }

    /// Length in minutes; zero for malformed (reversed) ranges.
    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.closes.minutes().saturating_sub(self.opens.minutes()))
    }

    pub fn to_specification(&self) -> OpeningHoursSpecification {
        OpeningHoursSpecification::new(
            DayOfWeek::from(self.weekday),
            self.opens.to_string(),
            self.closes.to_string(),
        )
    }

    pub fn to_open_range(&self) -> OpenRange {
        OpenRange {
            open: self.opens,
            closes: self.closes,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.weekday, self.opens, self.closes)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// External records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Weekday field of an input record: one day or a list of days.
///
/// Values may be plain names (`"Monday"`) or URIs ending in one
/// (`"https://schema.org/Monday"`). Resolved by the normalizer's expand step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayOfWeek {
    One(String),
    Many(Vec<String>),
}

impl DayOfWeek {
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            DayOfWeek::One(day) => vec![day.as_str()],
            DayOfWeek::Many(days) => days.iter().map(String::as_str).collect(),
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        DayOfWeek::One(day.name().to_string())
    }
}

/// Opening hours record as exchanged with callers.
///
/// `opens`/`closes` stay raw strings so that malformed values surface as
/// `InvalidTimeValue` from the normalizer rather than as a decode error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHoursSpecification {
    #[serde(rename = "@type", default = "d_specification_type")]
    pub kind: String,
    pub day_of_week: DayOfWeek,
    pub opens: String,
    pub closes: String,
}

impl OpeningHoursSpecification {
    pub fn new(day_of_week: DayOfWeek, opens: impl Into<String>, closes: impl Into<String>) -> Self {
        Self {
            kind: d_specification_type(),
            day_of_week,
            opens: opens.into(),
            closes: closes.into(),
        }
    }

    /// Shorthand for a single-day record.
    pub fn day(day: &str, opens: &str, closes: &str) -> Self {
        Self::new(DayOfWeek::One(day.to_string()), opens, closes)
    }
}

fn d_specification_type() -> String {
    OPENING_HOURS_SPECIFICATION.to_string()
}

/// One open range inside an [`OpenRangePerDay`] view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRange {
    pub open: ClockTime,
    pub closes: ClockTime,
}

/// All open ranges of one weekday.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRangePerDay {
    #[serde(rename = "@type")]
    pub kind: String,
    pub day_of_week: Weekday,
    pub open_range: Vec<OpenRange>,
}

impl OpenRangePerDay {
    pub fn new(day_of_week: Weekday, open_range: Vec<OpenRange>) -> Self {
        Self {
            kind: OPEN_RANGE_PER_DAY.to_string(),
            day_of_week,
            open_range,
        }
    }
}
