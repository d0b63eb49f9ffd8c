use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Opening hours service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default Monday used to anchor weekday wall-clock times when converting
/// between zones. Northern-hemisphere zones are on summer time that week.
pub const DEFAULT_REFERENCE_WEEK: (i32, u32, u32) = (2024, 6, 3);

/// Settings for one opening-hours service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// IANA zone the canonical schedule is stored in.
    #[serde(default = "d_timezone")]
    pub timezone: String,

    /// Monday of the week used to anchor wall-clock times during zone
    /// conversion. Offsets (and DST state) are read from this week.
    #[serde(default = "d_reference_week")]
    pub reference_week: NaiveDate,

    /// Same-day intervals whose gap is at most this many minutes are merged.
    #[serde(default = "d_adjacency_tolerance")]
    pub adjacency_tolerance_minutes: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timezone: d_timezone(),
            reference_week: d_reference_week(),
            adjacency_tolerance_minutes: d_adjacency_tolerance(),
        }
    }
}

fn d_timezone() -> String {
    "UTC".into()
}

pub fn d_reference_week() -> NaiveDate {
    let (y, m, d) = DEFAULT_REFERENCE_WEEK;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn d_adjacency_tolerance() -> u16 {
    1
}
