//! Bulk import command

use std::path::Path;

use anyhow::{Context, Result};
use insights_core::{db::Database, import::import_file, ImportSummary};

pub fn cmd_import(db: &Database, file: &Path, batch_size: usize) -> Result<ImportSummary> {
    println!("📥 Importing records from {}...", file.display());

    let summary = import_file(db, file, batch_size)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    for line in summary.report_lines() {
        println!("   {}", line);
    }

    if summary.failures.is_empty() {
        println!("✅ Import complete");
    } else {
        println!("⚠️  Import complete with errors");
    }

    Ok(summary)
}
