//! Wall-clock time of day with a `24:00` end-of-day sentinel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minutes since local midnight, `0..=1440`. `1440` is the `24:00` sentinel
/// and is only meaningful as a closing time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u16) -> Option<ClockTime> {
        (minutes <= MINUTES_PER_DAY).then_some(ClockTime(minutes))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<ClockTime> {
        if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
            return None;
        }
        Some(ClockTime((hour * 60 + minute) as u16))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn is_end_of_day(self) -> bool {
        self.0 == MINUTES_PER_DAY
    }

    /// Parse `HH:mm` (`00:00`..`23:59`) or the sentinel `24:00`.
    pub fn parse(value: &str) -> Result<ClockTime, Error> {
        let invalid = || Error::InvalidTimeValue(format!("'{value}' is not a HH:mm time"));
        let (h, m) = value.trim().split_once(':').ok_or_else(invalid)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        ClockTime::from_hm(hour, minute).ok_or_else(invalid)
    }

    /// Convert to a `NaiveTime`. `24:00` has no `NaiveTime` representation.
    pub fn to_naive(self) -> Option<chrono::NaiveTime> {
        if self.is_end_of_day() {
            return None;
        }
        chrono::NaiveTime::from_hms_opt(u32::from(self.0 / 60), u32::from(self.0 % 60), 0)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClockTime::parse(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}
