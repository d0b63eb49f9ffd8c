//! Subcommand bodies. Each returns the text to print so it can be tested
//! without capturing stdout.

use std::fmt::Write as _;

use anyhow::Context;
use chrono::{DateTime, Utc};

use oh_domain::config::{Config, ConfigSeverity};
use oh_hours::{ChangeState, OpeningHours};

const TIME_PATTERN: &str = "%a %Y-%m-%d %H:%M %Z";

/// Normalized records as pretty JSON.
pub fn export(hours: &OpeningHours, tz: Option<&str>) -> anyhow::Result<String> {
    let records = hours.opening_hours(tz)?;
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Per-day view as pretty JSON: all seven days, or one day's ranges.
pub fn days(hours: &OpeningHours, tz: Option<&str>, day: Option<&str>) -> anyhow::Result<String> {
    match day {
        Some(day) => Ok(serde_json::to_string_pretty(&hours.open_ranges_for_day(day, tz)?)?),
        None => Ok(serde_json::to_string_pretty(&hours.open_ranges_per_day(tz)?)?),
    }
}

/// Weekly total and closed days.
pub fn summary(hours: &OpeningHours) -> String {
    let closed: Vec<&str> = hours
        .days_without_opening_hours()
        .iter()
        .map(|d| d.name())
        .collect();
    let mut out = String::new();
    let _ = writeln!(out, "timezone:    {}", hours.timezone_name());
    let _ = writeln!(out, "total hours: {:.2}", hours.total_open_hours());
    let _ = writeln!(
        out,
        "closed days: {}",
        if closed.is_empty() { "none".to_string() } else { closed.join(", ") }
    );
    let _ = write!(out, "schedule:    {}", hours.compact_schedule());
    out
}

/// Parse an RFC 3339 instant, or use the service clock.
pub fn resolve_at(hours: &OpeningHours, at: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match at {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("parsing --at '{raw}' as RFC 3339"))?
            .with_timezone(&Utc)),
        None => Ok(hours.now()),
    }
}

/// Open/closed state at `at` and the next transition.
pub fn status(hours: &OpeningHours, at: DateTime<Utc>, json: bool) -> anyhow::Result<String> {
    let next = hours.next_change_at(at);
    if json {
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "open": hours.is_open_at(at),
            "next_change": next,
        }))?);
    }

    let mut out = String::new();
    let state = if hours.is_open_at(at) { "open" } else { "closed" };
    let _ = writeln!(out, "{state} at {}", hours.format_instant(at, TIME_PATTERN));
    match next {
        Some(change) => {
            let verb = match change.state {
                ChangeState::Open => "opens",
                ChangeState::Close => "closes",
            };
            let _ = write!(
                out,
                "{verb} {} (in {} minutes)",
                hours.format_instant(change.date, TIME_PATTERN),
                hours.minutes_until_next_change_at(at)
            );
        }
        None if hours.is_open_at(at) => out.push_str("always open"),
        None => out.push_str("always closed"),
    }
    Ok(out)
}

/// Report config issues; returns the text and whether the config is usable.
pub fn config_validate(config: &Config, config_path: &str) -> (String, bool) {
    let issues = config.validate();
    if issues.is_empty() {
        return (format!("Config OK ({config_path})"), true);
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    let mut out = String::new();
    for issue in &issues {
        let _ = writeln!(out, "{issue}");
    }
    let _ = write!(
        out,
        "\n{error_count} error(s), {warning_count} warning(s) in {config_path}"
    );
    (out, error_count == 0)
}

/// The resolved config (with all defaults filled in) as TOML.
pub fn config_show(config: &Config) -> anyhow::Result<String> {
    toml::to_string_pretty(config).context("serializing config")
}
