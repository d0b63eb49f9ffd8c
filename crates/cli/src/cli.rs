use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use oh_domain::config::Config;
use oh_domain::OpeningHoursSpecification;
use oh_hours::{OpeningHours, OpeningHoursBuilder};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "openinghours.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "OH_CONFIG";

/// openinghours: timezone-aware weekly opening hours.
#[derive(Debug, Parser)]
#[command(name = "openinghours", version, about)]
pub struct Cli {
    /// Path to the config file (overrides `OH_CONFIG`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to read opening hours from and which zone they are written in.
#[derive(Debug, Clone, Args)]
pub struct HoursArgs {
    /// JSON file holding an array of OpeningHoursSpecification records.
    #[arg(long)]
    pub hours: PathBuf,
    /// Zone the records are expressed in (defaults to the service zone).
    #[arg(long)]
    pub input_tz: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the normalized opening hours as JSON records.
    Export {
        #[command(flatten)]
        source: HoursArgs,
        /// Zone to export in (defaults to the service zone).
        #[arg(long)]
        tz: Option<String>,
    },
    /// Print open ranges per weekday.
    Days {
        #[command(flatten)]
        source: HoursArgs,
        /// Zone to view in (defaults to the service zone).
        #[arg(long)]
        tz: Option<String>,
        /// Only show this weekday.
        #[arg(long)]
        day: Option<String>,
    },
    /// Print total weekly hours and the days without opening hours.
    Summary {
        #[command(flatten)]
        source: HoursArgs,
    },
    /// Report whether the schedule is open and when it next changes.
    Status {
        #[command(flatten)]
        source: HoursArgs,
        /// Instant to evaluate (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<String>,
        /// Output the next change as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Check that an hours file normalizes cleanly.
    Check {
        #[command(flatten)]
        source: HoursArgs,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Resolve the config path: explicit flag, then `OH_CONFIG`, then
/// [`DEFAULT_CONFIG_FILE`].
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
    }
}

/// Load the configuration from `path`, falling back to defaults when the
/// file does not exist. Returns the parsed [`Config`] and the path used.
pub fn load_config(path: &Path) -> anyhow::Result<(Config, String)> {
    let shown = path.display().to_string();
    let config = if path.exists() {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading {shown}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing {shown}"))?
    } else {
        Config::default()
    };
    Ok((config, shown))
}

/// Read an hours file: a JSON array of records.
pub fn load_hours(path: &Path) -> anyhow::Result<Vec<OpeningHoursSpecification>> {
    let shown = path.display();
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {shown}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {shown}"))
}

/// Build the service from config and seed it with the hours file.
pub fn build_service(config: &Config, source: &HoursArgs) -> anyhow::Result<OpeningHours> {
    let specs = load_hours(&source.hours)?;
    let hours = OpeningHoursBuilder::from_config(&config.service)
        .hours(specs, source.input_tz.as_deref())
        .build()
        .with_context(|| format!("loading opening hours from {}", source.hours.display()))?;
    tracing::debug!(
        intervals = hours.canonical().len(),
        timezone = hours.timezone_name(),
        "service ready"
    );
    Ok(hours)
}
