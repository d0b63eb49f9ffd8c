//! Shared domain types for the opening-hours crates: weekdays, wall-clock
//! times, intervals, external record shapes, errors and configuration.

pub mod clock;
pub mod config;
pub mod error;
pub mod interval;
pub mod weekday;

pub use clock::{ClockTime, MINUTES_PER_DAY};
pub use error::{Error, Result};
pub use interval::{DayOfWeek, Interval, OpenRange, OpenRangePerDay, OpeningHoursSpecification};
pub use weekday::Weekday;
