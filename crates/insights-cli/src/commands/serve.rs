//! Server command implementation

use std::path::Path;

use anyhow::Result;
use insights_server::{ServerConfig, ALLOWED_ORIGINS_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting insights API server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = ServerConfig::from_env();
    if config.allowed_origins.is_empty() {
        println!("   CORS: same-origin only (set {} to allow others)", ALLOWED_ORIGINS_ENV);
    } else {
        println!("   CORS: {}", config.allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let static_dir = static_dir.and_then(|p| p.to_str());
    insights_server::serve(db, host, port, static_dir, config).await
}
