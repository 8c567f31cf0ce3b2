//! One-time database bootstrap: server probe, idempotent database and
//! index creation, design-document reconciliation.

use std::sync::Arc;

use futures::future::join_all;
use reqwest::Method;

use daybed_core::config::{ClientOptions, DatabaseConfig};
use daybed_core::models::ServerInfo;

use crate::client::Database;
use crate::design::reconcile_design_doc;
use crate::transport::{ReqwestTransport, Request, Transport};
use crate::Result;

/// Oldest server major version carrying the `_find` and `_index`
/// endpoints this client relies on.
const MIN_SUPPORTED_MAJOR: u64 = 2;

/// Validate the server, create the database, its indexes and design
/// documents as needed, and return a ready client.
///
/// Safe to run on every startup: an existing database answers the
/// create with 412, index creation is a server-side no-op when the
/// index exists, and up-to-date design documents are left unwritten.
pub async fn configure_database(
    base_url: &str,
    config: &DatabaseConfig,
    options: &ClientOptions,
) -> Result<Database> {
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(base_url, options)?);
    configure_database_with(transport, config, options.warnings).await
}

/// Bootstrap over an injected transport; what `configure_database` does
/// after constructing the production transport.
pub async fn configure_database_with(
    transport: Arc<dyn Transport>,
    config: &DatabaseConfig,
    warnings: bool,
) -> Result<Database> {
    let db = Database::with_transport(transport, &config.name, warnings);

    // An unreachable or failing server root is the one fatal probe
    let response = db.send(Request::new(Method::GET, "")).await?;
    if !response.is_success() {
        return Err(db.failure(response));
    }

    let info: ServerInfo = serde_json::from_str(&response.body).unwrap_or_default();
    if warnings && !version_supported(&info.version) {
        tracing::warn!(
            version = %info.version,
            "Server version below {}.0; some operations may fail server-side",
            MIN_SUPPORTED_MAJOR
        );
    }

    db.create_db().await?;

    if !config.indexes.is_empty() {
        db.create_index(&config.indexes).await?;
    }

    // Design documents are independent server resources; reconcile them
    // all at once. Failures are logged inside and never abort the others.
    join_all(
        config
            .design_docs
            .iter()
            .map(|design_doc| reconcile_design_doc(&db, design_doc)),
    )
    .await;

    tracing::debug!(database = %config.name, "Database configured");
    Ok(db)
}

/// True when the reported version is at or above the minimum supported
/// major version; unparseable versions count as unsupported.
fn version_supported(version: &str) -> bool {
    version
        .split('.')
        .next()
        .and_then(|major| major.parse::<u64>().ok())
        .map(|major| major >= MIN_SUPPORTED_MAJOR)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use daybed_core::config::{DesignDocConfig, ViewConfig};

    #[test]
    fn test_version_supported() {
        assert!(version_supported("3.3.2"));
        assert!(version_supported("2.0.0"));
        assert!(!version_supported("1.7.2"));
        assert!(!version_supported(""));
        assert!(!version_supported("banana"));
    }

    fn config_with_views() -> DatabaseConfig {
        DatabaseConfig {
            name: "orders".to_string(),
            indexes: vec!["customer".to_string()],
            design_docs: vec![DesignDocConfig {
                name: "search".to_string(),
                views: vec![ViewConfig {
                    name: "by_customer".to_string(),
                    map: "function (doc) { emit(doc.customer); }".to_string(),
                    reduce: None,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_first_run_creates_everything() {
        let mock = Arc::new(MockTransport::new());
        mock.push("", 200, r#"{"couchdb": "Welcome", "version": "3.3.2"}"#);
        mock.push("orders", 201, r#"{"ok": true}"#);
        mock.push("orders/_index", 200, r#"{"result": "created"}"#);
        mock.push("orders/_design/search", 404, r#"{"error": "not_found"}"#);
        mock.push("orders/_design/search", 201, r#"{"ok": true}"#);

        let db = configure_database_with(mock.clone(), &config_with_views(), true)
            .await
            .unwrap();
        assert_eq!(db.name(), "orders");

        let paths: Vec<String> = mock.sent().iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                "",
                "orders",
                "orders/_index",
                "orders/_design/search",
                "orders/_design/search"
            ]
        );
    }

    #[tokio::test]
    async fn test_second_run_issues_no_design_writes() {
        let mock = Arc::new(MockTransport::new());
        mock.push("", 200, r#"{"couchdb": "Welcome", "version": "3.3.2"}"#);
        mock.push("orders", 412, r#"{"error": "file_exists"}"#);
        mock.push("orders/_index", 200, r#"{"result": "exists"}"#);
        mock.push(
            "orders/_design/search",
            200,
            r#"{"_id": "_design/search", "_rev": "1-a", "language": "javascript",
                "views": {"by_customer": {"map": "function (doc) { emit(doc.customer); }"}}}"#,
        );

        configure_database_with(mock.clone(), &config_with_views(), true)
            .await
            .unwrap();

        let design_writes = mock
            .sent()
            .iter()
            .filter(|r| r.path.starts_with("orders/_design") && r.method == Method::PUT)
            .count();
        assert_eq!(design_writes, 0, "unchanged config must be a no-op");
    }

    #[tokio::test]
    async fn test_unreachable_root_is_fatal() {
        let mock = Arc::new(MockTransport::new());
        mock.push("", 502, "Bad Gateway");

        let error = configure_database_with(mock.clone(), &config_with_views(), true)
            .await
            .unwrap_err();
        assert_eq!(error.status(), Some(502));
        assert_eq!(mock.sent().len(), 1, "nothing may run after a failed probe");
    }

    #[tokio::test]
    async fn test_db_create_failure_is_fatal() {
        let mock = Arc::new(MockTransport::new());
        mock.push("", 200, r#"{"couchdb": "Welcome", "version": "3.3.2"}"#);
        mock.push("orders", 401, r#"{"error": "unauthorized"}"#);

        let error = configure_database_with(mock.clone(), &config_with_views(), true)
            .await
            .unwrap_err();
        assert_eq!(error.status(), Some(401));
    }

    #[tokio::test]
    async fn test_design_doc_failure_is_not_fatal() {
        let mock = Arc::new(MockTransport::new());
        mock.push("", 200, r#"{"couchdb": "Welcome", "version": "3.3.2"}"#);
        mock.push("orders", 412, r#"{"error": "file_exists"}"#);
        mock.push("orders/_index", 200, r#"{"result": "exists"}"#);
        mock.push("orders/_design/search", 500, r#"{"error": "internal"}"#);

        let db = configure_database_with(mock.clone(), &config_with_views(), true).await;
        assert!(db.is_ok(), "reconciliation failures must not abort bootstrap");
    }

    #[tokio::test]
    async fn test_old_server_version_warns_but_proceeds() {
        let mock = Arc::new(MockTransport::new());
        mock.push("", 200, r#"{"couchdb": "Welcome", "version": "1.7.2"}"#);
        mock.push("orders", 201, r#"{"ok": true}"#);

        let config = DatabaseConfig::new("orders");
        let db = configure_database_with(mock.clone(), &config, true).await;
        assert!(db.is_ok());
    }

    #[tokio::test]
    async fn test_no_index_config_skips_index_request() {
        let mock = Arc::new(MockTransport::new());
        mock.push("", 200, r#"{"couchdb": "Welcome", "version": "3.3.2"}"#);
        mock.push("orders", 201, r#"{"ok": true}"#);

        let config = DatabaseConfig::new("orders");
        configure_database_with(mock.clone(), &config, true)
            .await
            .unwrap();
        assert!(mock.sent().iter().all(|r| r.path != "orders/_index"));
    }
}
