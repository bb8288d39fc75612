//! Database access layer with connection pooling and migrations
//!
//! This module is organized by concern:
//! - `records` - Record insertion, listing and lookup
//! - `stats` - Aggregate statistics, filter options and facets

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod records;
mod stats;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Columns selected for a full `Record`, in `row_to_record` order
pub(crate) const RECORD_COLUMNS: &str =
    "id, end_year, intensity, sector, topic, insight, url, region, start_year, impact, \
     added, published, country, relevance, pestle, source, title, likelihood";

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "insights_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().into_owned();

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the importer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Insight records (flat, every column nullable)
            -- added/published hold UTC text in timestamp::STORAGE_FORMAT
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY,
                end_year INTEGER,
                intensity INTEGER,
                sector TEXT,
                topic TEXT,
                insight TEXT,
                url TEXT,
                region TEXT,
                start_year INTEGER,
                impact TEXT,
                added TEXT,
                published TEXT,
                country TEXT,
                relevance INTEGER,
                pestle TEXT,
                source TEXT,
                title TEXT,
                likelihood INTEGER,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_records_end_year ON records(end_year);
            CREATE INDEX IF NOT EXISTS idx_records_start_year ON records(start_year);
            CREATE INDEX IF NOT EXISTS idx_records_sector ON records(sector);
            CREATE INDEX IF NOT EXISTS idx_records_topic ON records(topic);
            CREATE INDEX IF NOT EXISTS idx_records_region ON records(region);
            CREATE INDEX IF NOT EXISTS idx_records_country ON records(country);
            CREATE INDEX IF NOT EXISTS idx_records_pestle ON records(pestle);
            CREATE INDEX IF NOT EXISTS idx_records_source ON records(source);
            CREATE INDEX IF NOT EXISTS idx_records_added ON records(added);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
