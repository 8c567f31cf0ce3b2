//! daybed Client Library
//!
//! Async, typed HTTP client for CouchDB-compatible document databases:
//! CRUD and bulk writes, selector queries, listings, map/reduce view
//! execution, and an idempotent database bootstrap that keeps design
//! documents reconciled with their configured views.

mod bootstrap;
mod client;
mod design;
mod params;
mod transport;

pub use bootstrap::{configure_database, configure_database_with};
pub use client::Database;
pub use transport::{ReqwestTransport, Request, Response, Transport};

pub use daybed_core::config::{ClientOptions, DatabaseConfig, DesignDocConfig, ViewConfig};
pub use daybed_core::models::{
    BulkDocResult, CreateDbResult, DbInfo, DesignDocument, FindOptions, FindResult, ListOptions,
    ListResult, RevisionInfo, ServerInfo, ViewDefinition, ViewResult, ViewRow, WriteResult,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{host} returned {status} {status_text}: {body}")]
    Database {
        status: u16,
        status_text: String,
        body: String,
        host: String,
    },
}

impl Error {
    /// True for failures reported by the database server itself, as
    /// opposed to connectivity or decoding problems. Database errors
    /// always retain the original status and response body.
    pub fn is_database(&self) -> bool {
        matches!(self, Error::Database { .. })
    }

    /// HTTP status of a database error, `None` for anything else
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Database { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
