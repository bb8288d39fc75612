//! Statistics and filter option commands
//!
//! Output is pretty-printed JSON, the same shape the HTTP API returns.

use anyhow::Result;
use insights_core::{build_predicate, db::Database, FilterOptions, RecordStats};

/// Summary statistics for the records matching `filters`
pub fn stats_for(db: &Database, filters: &[(String, String)]) -> Result<RecordStats> {
    let predicate = build_predicate(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    tracing::debug!("Stats predicate: {:?}", predicate);
    Ok(db.record_stats(&predicate)?)
}

pub fn cmd_stats(db: &Database, filters: &[(String, String)]) -> Result<()> {
    let stats = stats_for(db, filters)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub fn options_for(db: &Database) -> Result<FilterOptions> {
    Ok(db.filter_options()?)
}

pub fn cmd_options(db: &Database) -> Result<()> {
    let options = options_for(db)?;
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}
