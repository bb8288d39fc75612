//! Insights Core Library
//!
//! Shared functionality for the insights dashboard:
//! - Record store access and migrations (SQLite)
//! - Predicate tree compiled to SQL and evaluated in memory
//! - Query parameter parsing into predicates
//! - Aggregate statistics and facets over filtered views
//! - Bulk JSON import

pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod predicate;
pub mod query;
pub mod timestamp;

/// Test utilities including the shared fixture dataset
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use db::Database;
pub use error::{Error, Result};
pub use import::{ImportFailure, ImportSummary, DEFAULT_BATCH_SIZE};
pub use models::{FilterOptions, NewRecord, Record, RecordStats};
pub use predicate::{Field, Predicate, Value};
pub use query::build_predicate;
