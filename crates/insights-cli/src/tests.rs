//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use clap::Parser;
use insights_core::test_utils::seeded_db;
use tempfile::{NamedTempFile, TempDir};

use crate::cli::{parse_filter, Cli, Commands};
use crate::commands;

fn filters(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_filter() {
    assert_eq!(
        parse_filter("sector=Energy").unwrap(),
        ("sector".to_string(), "Energy".to_string())
    );
    // Only the first '=' splits
    assert_eq!(
        parse_filter("title=a=b").unwrap(),
        ("title".to_string(), "a=b".to_string())
    );
    assert_eq!(
        parse_filter("sector=").unwrap(),
        ("sector".to_string(), String::new())
    );
    assert!(parse_filter("sector").is_err());
    assert!(parse_filter("=Energy").is_err());
}

#[test]
fn test_cli_parses_stats_filters() {
    let cli = Cli::try_parse_from([
        "insights",
        "--db",
        "data.db",
        "stats",
        "-f",
        "sector=Energy",
        "--filter",
        "end_years=2017,null",
    ])
    .unwrap();

    assert_eq!(cli.db.to_str(), Some("data.db"));
    match cli.command {
        Commands::Stats { filters: f } => {
            assert_eq!(f, filters(&[("sector", "Energy"), ("end_years", "2017,null")]));
        }
        _ => panic!("expected stats command"),
    }
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["insights", "serve"]).unwrap();
    assert_eq!(cli.db.to_str(), Some("insights.db"));
    assert!(!cli.verbose);
    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            assert_eq!(port, 8000);
            assert_eq!(host, "127.0.0.1");
            assert!(static_dir.is_none());
        }
        _ => panic!("expected serve command"),
    }

    let cli = Cli::try_parse_from(["insights", "import", "--file", "data.json"]).unwrap();
    match cli.command {
        Commands::Import { batch_size, .. } => {
            assert_eq!(batch_size, insights_core::DEFAULT_BATCH_SIZE)
        }
        _ => panic!("expected import command"),
    }
}

// ========== Init / Import Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("insights.db");

    commands::cmd_init(&path).unwrap();
    assert!(path.exists());

    // Running again is harmless
    commands::cmd_init(&path).unwrap();
}

#[test]
fn test_cmd_import() {
    let dir = TempDir::new().unwrap();
    let db = commands::open_db(&dir.path().join("insights.db")).unwrap();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"title": "One", "sector": "Energy", "intensity": 6,
              "added": "January, 20 2017 03:51:25"}},
            {{"title": "Two", "sector": "", "intensity": "high"}},
            {{"title": "Three", "end_year": "2018"}}
        ]"#
    )
    .unwrap();

    let summary = commands::cmd_import(&db, file.path(), 1).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].item, "Two");

    let stats = commands::stats_for(&db, &[]).unwrap();
    assert_eq!(stats.total_records, 2);
}

#[test]
fn test_cmd_import_missing_file() {
    let db = insights_core::Database::in_memory().unwrap();
    let result = commands::cmd_import(&db, std::path::Path::new("/nonexistent.json"), 10);
    assert!(result.is_err());
}

#[test]
fn test_cmd_import_rejects_object() {
    let db = insights_core::Database::in_memory().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"title": "not an array"}}"#).unwrap();

    let result = commands::cmd_import(&db, file.path(), 10);
    assert!(result.is_err());
}

// ========== Stats / Options Tests ==========

#[test]
fn test_stats_for_filters() {
    let db = seeded_db();

    let stats = commands::stats_for(&db, &filters(&[("sectors", "Energy")])).unwrap();
    assert_eq!(stats.total_records, 3);

    // Unparseable values impose no constraint
    let stats = commands::stats_for(&db, &filters(&[("intensity_min", "abc")])).unwrap();
    assert_eq!(stats.total_records, 7);
}

#[test]
fn test_cmd_stats_and_options_print() {
    let db = seeded_db();
    assert!(commands::cmd_stats(&db, &filters(&[("end_years", "2017,null")])).is_ok());
    assert!(commands::cmd_options(&db).is_ok());
}

#[test]
fn test_options_for() {
    let db = seeded_db();
    let options = commands::options_for(&db).unwrap();
    assert_eq!(options.end_years, vec![2017, 2018, 2019, 2020, 2021]);
    assert_eq!(options.topics.len(), 5);
}
