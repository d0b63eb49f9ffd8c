mod logging;
mod service;

pub use logging::*;
pub use service::*;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Largest adjacency tolerance accepted; anything wider would start merging
/// genuinely separate ranges.
pub const MAX_ADJACENCY_TOLERANCE_MINUTES: u16 = 60;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Check the config for problems. An empty list means the config is
    /// usable; entries with [`ConfigSeverity::Error`] must be fixed first.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Same acceptance rule as the service: surrounding whitespace is ignored.
        if self.service.timezone.trim().parse::<chrono_tz::Tz>().is_err() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "service.timezone".into(),
                message: format!(
                    "invalid timezone '{}': use IANA names like 'America/New_York' or 'UTC'",
                    self.service.timezone
                ),
            });
        }

        if self.service.reference_week.weekday() != chrono::Weekday::Mon {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "service.reference_week".into(),
                message: format!(
                    "{} is a {}, reference week must start on a Monday",
                    self.service.reference_week,
                    self.service.reference_week.weekday()
                ),
            });
        }

        let tolerance = self.service.adjacency_tolerance_minutes;
        if tolerance > MAX_ADJACENCY_TOLERANCE_MINUTES {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "service.adjacency_tolerance_minutes".into(),
                message: format!(
                    "{tolerance} exceeds the maximum of {MAX_ADJACENCY_TOLERANCE_MINUTES} minutes"
                ),
            });
        } else if tolerance == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "service.adjacency_tolerance_minutes".into(),
                message: "0 disables merging of back-to-back ranges expressed with a 1-minute gap"
                    .into(),
            });
        }

        if self.logging.filter.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "logging.filter".into(),
                message: "empty filter, nothing will be logged unless RUST_LOG is set".into(),
            });
        }

        errors
    }

    /// True when [`Config::validate`] reports no errors (warnings allowed).
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|e| e.severity != ConfigSeverity::Error)
    }
}
