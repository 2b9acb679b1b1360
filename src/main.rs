//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `country_status` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use country_status::initialization::init_logger_with;
use country_status::server::run_server;
use country_status::{build_service, Cli, Command, Config, CountryQuery, SortOrder};

#[tokio::main]
async fn main() -> Result<()> {
    // Try the current directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = Config::from(cli.opt);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(config, cli.command).await {
        eprintln!("country_status error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(config: Config, command: Command) -> Result<()> {
    let service = build_service(&config).await?;

    match command {
        Command::Serve { port } => run_server(port, Arc::new(service)).await,
        Command::Refresh => {
            let summary = service.refresh().await?;
            println!(
                "✅ Refreshed {} countr{} at {}{}",
                summary.total_countries,
                if summary.total_countries == 1 { "y" } else { "ies" },
                summary.refreshed_at.to_rfc3339(),
                if summary.skipped > 0 {
                    format!(" ({} skipped)", summary.skipped)
                } else {
                    String::new()
                }
            );
            println!("Results saved in {}", config.db_path.display());
            Ok(())
        }
        Command::Status => print_json(&service.status().await?),
        Command::List {
            region,
            currency,
            sort,
        } => {
            let query = CountryQuery {
                region,
                currency_code: currency,
                sort: SortOrder::from_param(sort.as_deref()),
            };
            print_json(&service.list(&query).await?)
        }
        Command::Get { name } => print_json(&service.get_by_name(&name).await?),
        Command::Delete { name } => {
            service.delete_by_name(&name).await?;
            println!("Deleted {name}");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
