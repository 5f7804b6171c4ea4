//! Config validation CLI tool
//!
//! Validates a dashboardd configuration file and reports any errors.

use dashboard_config::{ActiveSessionsMode, ConfigError};
use dashboard_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a dashboardd configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match dashboard_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", dashboard_config::CURRENT_CONFIG_VERSION);
            println!("  Listen address: {}", settings.service.listen_addr);
            println!("  Data directory: {}", settings.service.data_dir.display());
            println!(
                "  Inactivity timeout: {}",
                format_duration(settings.session.inactivity_timeout)
            );
            println!(
                "  Durable retention: {} days",
                settings.session.durable_retention.num_days()
            );
            match settings.analytics.active_sessions {
                ActiveSessionsMode::Random { min, max } => {
                    println!("  Active sessions: random ({}..={})", min, max)
                }
                ActiveSessionsMode::LoggedIn => println!("  Active sessions: logged-in count"),
            }
            println!(
                "  Seed: {} accounts, {} revenue events, {} categories",
                settings.seed.accounts.len(),
                settings.seed.revenue.len(),
                settings.seed.categories.len()
            );

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        dashboard_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
