use crate::clock::ClockTime;
use crate::interval::Interval;
use crate::weekday::Weekday;

/// Shared error type used across all opening-hours crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid weekday: '{0}'")]
    InvalidWeekday(String),

    #[error("invalid time value: {0}")]
    InvalidTimeValue(String),

    #[error("invalid time range on {day}: opens {opens} must be before closes {closes}")]
    InvalidTimeRange {
        day: Weekday,
        opens: ClockTime,
        closes: ClockTime,
    },

    #[error("overlapping opening hours: {first} overlaps {second}")]
    Overlap { first: Interval, second: Interval },

    #[error("schedule engine: {0}")]
    Engine(String),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
