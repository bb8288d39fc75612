//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod records;
pub mod stats;

// Re-export all handlers for use in router
pub use records::*;
pub use stats::*;
