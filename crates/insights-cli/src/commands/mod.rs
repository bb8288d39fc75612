//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init command and shared utilities (open_db)
//! - `import` - Bulk JSON import
//! - `serve` - Web server command
//! - `stats` - Statistics and filter option reports

pub mod core;
pub mod import;
pub mod serve;
pub mod stats;

// Re-export command functions for main.rs
pub use self::core::*;
pub use import::*;
pub use serve::*;
pub use stats::*;
