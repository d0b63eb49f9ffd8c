use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Day of the week, in ISO order (Monday first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Zero-based position in [`Weekday::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Weekday {
        Self::ALL[index % 7]
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Two-letter code used in compact schedule strings.
    pub fn code(self) -> &'static str {
        match self {
            Weekday::Monday => "Mo",
            Weekday::Tuesday => "Tu",
            Weekday::Wednesday => "We",
            Weekday::Thursday => "Th",
            Weekday::Friday => "Fr",
            Weekday::Saturday => "Sa",
            Weekday::Sunday => "Su",
        }
    }

    pub fn from_code(code: &str) -> Option<Weekday> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Shift by a signed number of days, wrapping around the week.
    pub fn shift(self, days: i64) -> Weekday {
        let idx = (self.index() as i64 + days).rem_euclid(7);
        Self::from_index(idx as usize)
    }

    /// Parse a weekday token: a plain name (any case) or a URI whose last
    /// path segment is a plain name, e.g. `https://schema.org/Monday`.
    pub fn parse(token: &str) -> Result<Weekday, Error> {
        let trimmed = token.trim().trim_end_matches('/');
        let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidWeekday(token.to_string()))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::parse(s)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday::from_index(day.num_days_from_monday() as usize)
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_names_any_case() {
        assert_eq!(Weekday::parse("Monday").unwrap(), Weekday::Monday);
        assert_eq!(Weekday::parse("sunday").unwrap(), Weekday::Sunday);
        assert_eq!(Weekday::parse(" FRIDAY ").unwrap(), Weekday::Friday);
    }

    #[test]
    fn parse_uri_suffix() {
        assert_eq!(
            Weekday::parse("https://schema.org/Tuesday").unwrap(),
            Weekday::Tuesday
        );
        assert_eq!(
            Weekday::parse("http://schema.org/Saturday/").unwrap(),
            Weekday::Saturday
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!(matches!(Weekday::parse("Funday"), Err(Error::InvalidWeekday(_))));
        assert!(matches!(Weekday::parse(""), Err(Error::InvalidWeekday(_))));
        assert!(matches!(Weekday::parse("Mo"), Err(Error::InvalidWeekday(_))));
    }

    #[test]
    fn shift_wraps_both_ways() {
        assert_eq!(Weekday::Sunday.shift(1), Weekday::Monday);
        assert_eq!(Weekday::Monday.shift(-1), Weekday::Sunday);
        assert_eq!(Weekday::Wednesday.shift(0), Weekday::Wednesday);
        assert_eq!(Weekday::Saturday.shift(2), Weekday::Monday);
    }

    #[test]
    fn codes_roundtrip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_code(day.code()), Some(day));
        }
        assert_eq!(Weekday::from_code("Xx"), None);
    }

    #[test]
    fn chrono_conversion() {
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
        assert_eq!(chrono::Weekday::from(Weekday::Thursday), chrono::Weekday::Thu);
    }
}
