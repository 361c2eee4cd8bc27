//! WP DB Migrate Main Entry Point
//!
//! Renames the table prefix of a WordPress database or merges the users
//! tables of two installations. Run with `--help` for the commands.

use std::env;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wp_db_migrate::CliError;
use wp_db_migrate::cli::{self, Cli};

/// Initialize tracing/logging. Logs go to stderr so stdout only carries the
/// report.
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "wp_db_migrate=debug,wp_db_migrate_repository=debug"
    } else {
        "wp_db_migrate=info,wp_db_migrate_repository=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    info!(
        service_name = "wp-db-migrate",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.debug);
    let json = cli.json;

    match cli::run(cli).await {
        Ok(Some(report)) => match cli::print_report(&report, json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{} {e}", "Error:".red().bold());
                ExitCode::FAILURE
            }
        },
        Ok(None) => ExitCode::SUCCESS,
        Err(CliError::Failed(failure)) => {
            error!(error = %failure.error, "Migration failed");
            if let Err(e) = cli::print_report(&failure.report, json) {
                eprintln!("{} {e}", "Error:".red().bold());
            }
            eprintln!("{} {}", "Error:".red().bold(), failure.error);
            eprintln!("{}", failure.warning.yellow());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
