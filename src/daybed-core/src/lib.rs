//! daybed Core Library
//!
//! Shared types for the daybed document-database client:
//! - Desired-state configuration (databases, indexes, design documents)
//! - Wire models for documents, listings, views and bulk outcomes

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::{ClientOptions, DatabaseConfig, DesignDocConfig, ViewConfig};
pub use models::*;
