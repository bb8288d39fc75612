//! Insights CLI - Record store and statistics API for the insights dashboard
//!
//! Usage:
//!   insights init                     Initialize database
//!   insights import --file data.json  Import records from a JSON array
//!   insights stats -f sector=Energy   Print statistics for a filtered view
//!   insights serve --port 8000        Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import { file, batch_size } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_import(&db, &file, batch_size).map(|_| ())
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, static_dir.as_deref()).await,
        Commands::Stats { filters } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_stats(&db, &filters)
        }
        Commands::Options => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_options(&db)
        }
    }
}
