use serde::{Deserialize, Serialize};

use crate::models::ViewDefinition;

/// Desired shape of one database: its name, the fields to cover with a
/// secondary index, and the design documents (with their views) that
/// bootstrap keeps reconciled on the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub name: String,
    #[serde(default)]
    pub indexes: Vec<String>,
    #[serde(default)]
    pub design_docs: Vec<DesignDocConfig>,
}

impl DatabaseConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indexes: Vec::new(),
            design_docs: Vec::new(),
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read database config from {}", path))?;
        let config: DatabaseConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse database config from {}", path))?;
        tracing::debug!(database = %config.name, "Loaded database config");
        Ok(config)
    }
}

/// One named design document and the views it should contain
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DesignDocConfig {
    pub name: String,
    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

/// A named view: serialized map function plus optional reduce
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    pub name: String,
    pub map: String,
    #[serde(default)]
    pub reduce: Option<String>,
}

impl ViewConfig {
    /// The wire-format definition this view should have on the server
    pub fn definition(&self) -> ViewDefinition {
        ViewDefinition {
            map: self.map.clone(),
            reduce: self.reduce.clone(),
        }
    }
}

/// Client-level options shared by every operation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientOptions {
    /// Emit advisory warnings (missing revision on writes, server query
    /// warnings, unsupported server version)
    #[serde(default = "default_warnings")]
    pub warnings: bool,

    /// Basic-auth credentials
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    /// Proxy URL for all outbound requests
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_warnings() -> bool {
    true
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            warnings: default_warnings(),
            username: None,
            password: None,
            proxy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses() {
        let config: DatabaseConfig = serde_json::from_str(r#"{"name": "orders"}"#).unwrap();
        assert_eq!(config.name, "orders");
        assert!(config.indexes.is_empty());
        assert!(config.design_docs.is_empty());
    }

    #[test]
    fn test_full_config_parses() {
        let config: DatabaseConfig = serde_json::from_str(
            r#"{
                "name": "orders",
                "indexes": ["customer_id", "placed_at"],
                "design_docs": [{
                    "name": "search",
                    "views": [
                        {"name": "by_customer", "map": "function (doc) { emit(doc.customer_id); }"},
                        {"name": "totals", "map": "function (doc) { emit(null, doc.total); }", "reduce": "_sum"}
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.indexes.len(), 2);
        let views = &config.design_docs[0].views;
        assert_eq!(views[0].definition().reduce, None);
        assert_eq!(views[1].definition().reduce.as_deref(), Some("_sum"));
    }

    #[test]
    fn test_client_options_default_warnings_on() {
        let options = ClientOptions::default();
        assert!(options.warnings);
        assert!(options.username.is_none());

        let parsed: ClientOptions = serde_json::from_str("{}").unwrap();
        assert!(parsed.warnings);
    }
}
