use clap::Parser;
use tracing_subscriber::EnvFilter;

use oh_cli::cli::{self, Cli, Command, ConfigCommand};
use oh_cli::commands;
use oh_domain::config::LoggingConfig;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config_path = cli::config_path(args.config.as_deref());
    let (config, shown_path) = cli::load_config(&config_path)?;
    init_tracing(&config.logging);

    match args.command {
        Command::Export { source, tz } => {
            let hours = cli::build_service(&config, &source)?;
            println!("{}", commands::export(&hours, tz.as_deref())?);
        }
        Command::Days { source, tz, day } => {
            let hours = cli::build_service(&config, &source)?;
            println!("{}", commands::days(&hours, tz.as_deref(), day.as_deref())?);
        }
        Command::Summary { source } => {
            let hours = cli::build_service(&config, &source)?;
            println!("{}", commands::summary(&hours));
        }
        Command::Status { source, at, json } => {
            let hours = cli::build_service(&config, &source)?;
            let at = commands::resolve_at(&hours, at.as_deref())?;
            println!("{}", commands::status(&hours, at, json)?);
        }
        Command::Check { source } => match cli::build_service(&config, &source) {
            Ok(hours) => println!(
                "OK: {} range(s), {:.2} hours/week ({})",
                hours.canonical().len(),
                hours.total_open_hours(),
                source.hours.display()
            ),
            Err(e) => {
                eprintln!("invalid: {e:#}");
                std::process::exit(1);
            }
        },
        Command::Config(ConfigCommand::Validate) => {
            let (report, valid) = commands::config_validate(&config, &shown_path);
            println!("{report}");
            if !valid {
                std::process::exit(1);
            }
        }
        Command::Config(ConfigCommand::Show) => {
            print!("{}", commands::config_show(&config)?);
        }
        Command::Version => {
            println!("openinghours {}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

/// Install the global subscriber: `RUST_LOG` wins over the configured
/// filter; output goes to stderr so stdout stays machine-readable.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
