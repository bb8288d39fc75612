//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use insights_core::DEFAULT_BATCH_SIZE;

/// Insights - Explore a dataset of market and policy insights
#[derive(Parser)]
#[command(name = "insights")]
#[command(
    about = "Filterable record store and statistics API for an insights dashboard",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "insights.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import records from a JSON array file
    Import {
        /// JSON file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Records per insert transaction
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing the dashboard's static files (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Print summary statistics for a filtered view
    Stats {
        /// Filter as key=value, same names as the HTTP API (repeatable)
        ///
        /// Example: -f sector=Energy -f end_years=2017,null
        #[arg(short = 'f', long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Print the distinct values available to each filter menu
    Options,
}

/// Parse a `key=value` filter argument
pub fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid filter '{}': expected key=value", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid filter '{}': empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}
