//! Bootstrap Example
//!
//! Declares a database with an index and a design document full of
//! views, lets `configure_database` reconcile it all, then queries a
//! view. Running it twice demonstrates that an unchanged configuration
//! writes nothing on the second pass.
//!
//! Run with: cargo run --example bootstrap_views

use daybed_rs::{
    configure_database, ClientOptions, DatabaseConfig, DesignDocConfig, ListOptions, ViewConfig,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("daybed bootstrap example\n");

    let config = DatabaseConfig {
        name: "daybed_orders".to_string(),
        indexes: vec!["customer".to_string()],
        design_docs: vec![DesignDocConfig {
            name: "search".to_string(),
            views: vec![
                ViewConfig {
                    name: "by_customer".to_string(),
                    map: "function (doc) { emit(doc.customer, doc.total); }".to_string(),
                    reduce: None,
                },
                ViewConfig {
                    name: "total_sales".to_string(),
                    map: "function (doc) { emit(null, doc.total); }".to_string(),
                    reduce: Some("_sum".to_string()),
                },
            ],
        }],
    };

    let db = configure_database("http://localhost:5984", &config, &ClientOptions::default()).await?;
    println!("✅ Database, index and views ready");

    let results = db
        .bulk(&[
            json!({"customer": "alice", "total": 42}),
            json!({"customer": "bob", "total": 7}),
            json!({"customer": "alice", "total": 12}),
        ])
        .await?;
    println!(
        "📝 Bulk write: {}/{} accepted",
        results.iter().filter(|r| r.is_success()).count(),
        results.len()
    );

    let options = ListOptions {
        key: Some(json!("alice")),
        ..Default::default()
    };
    let rows = db.view("search", "by_customer", Some(options)).await?;
    println!("🔍 alice's orders:");
    for row in &rows.rows {
        println!("   {} -> {}", row.id.as_deref().unwrap_or("?"), row.value);
    }

    let totals = db.view("search", "total_sales", None).await?;
    if let Some(row) = totals.rows.first() {
        println!("💰 Total sales: {}", row.value);
    }

    Ok(())
}
