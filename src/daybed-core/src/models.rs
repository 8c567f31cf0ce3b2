use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// WriteResult represents the server's answer to a single document write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    pub id: String,
    pub rev: String,
    #[serde(default = "default_true")]
    pub ok: bool,
}

fn default_true() -> bool {
    true
}

/// RevisionInfo is the per-row payload of a listing that excludes documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionInfo {
    pub rev: String,
}

/// Options for `_all_docs` listings and view execution.
///
/// Structured key fields (`key`, `keys`, `start_key`, `end_key`) take any
/// JSON value; the client JSON-encodes them into the query string, which is
/// what the server's query parser expects. Everything else is passed through
/// as a plain scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusive_end: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_level: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_docs: Option<bool>,
}

/// ListResult is a typed `_all_docs` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub total_rows: u64,
    pub rows: Vec<T>,
}

/// A `_find` request body. The selector is mandatory; the remaining
/// fields are forwarded only when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindOptions {
    pub selector: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_index: Option<String>,
}

impl FindOptions {
    /// Build options carrying only a selector
    pub fn new(selector: Value) -> Self {
        Self {
            selector,
            ..Default::default()
        }
    }
}

/// FindResult represents a `_find` response
#[derive(Debug, Clone, Deserialize)]
pub struct FindResult<T> {
    pub docs: Vec<T>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// One row of a view or `_all_docs` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}

/// ViewResult is the raw response of a view execution. Reduced views
/// carry rows only; `offset` and `total_rows` appear on map output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    pub rows: Vec<ViewRow>,
}

/// Per-document outcome of a `_bulk_docs` request.
///
/// The batch itself succeeds or fails as one HTTP request; inside a
/// successful batch each document either went through (`Success`) or was
/// rejected (`Failure`, e.g. `error: "conflict"`). The two shapes share
/// one positionally-aligned response array, discriminated by the
/// presence of an `error` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkDocResult {
    Failure {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        error: String,
        #[serde(default)]
        reason: String,
    },
    Success {
        id: String,
        rev: String,
        #[serde(default = "default_true")]
        ok: bool,
    },
}

impl BulkDocResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BulkDocResult::Success { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            BulkDocResult::Success { id, .. } => Some(id),
            BulkDocResult::Failure { id, .. } => id.as_deref(),
        }
    }
}

/// A single view definition inside a design document. The map and reduce
/// bodies are opaque strings executed by the server; equality is exact
/// string equality, which is what decides whether reconciliation writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<String>,
}

/// DesignDocument is the server-side container of named views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub views: HashMap<String, ViewDefinition>,
}

fn default_language() -> String {
    "javascript".to_string()
}

impl DesignDocument {
    /// An empty design document shell for the given name, used as the
    /// comparison baseline when the server has no document yet.
    pub fn shell(name: &str) -> Self {
        Self {
            id: format!("_design/{}", name),
            rev: None,
            language: default_language(),
            views: HashMap::new(),
        }
    }
}

/// ServerInfo represents the root endpoint's greeting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub couchdb: String,
    #[serde(default)]
    pub version: String,
}

/// DbInfo represents database-level metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbInfo {
    pub db_name: String,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(default)]
    pub doc_del_count: u64,
    #[serde(default)]
    pub update_seq: Value,
}

/// Outcome of a database creation; an already-existing database is a
/// success, flagged so callers can tell first creation apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDbResult {
    pub ok: bool,
    pub already_existed: bool,
}
