//! Quickstart Example
//!
//! Basic document CRUD against a running CouchDB-compatible server on
//! localhost:5984.
//!
//! Run with: cargo run --example quickstart

use daybed_rs::{ClientOptions, Database, FindOptions};
use serde_json::json;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("daybed quickstart\n");

    let options = ClientOptions::default();
    let db = Database::new("http://localhost:5984", "daybed_quickstart", &options)?;

    let created = db.create_db().await?;
    if created.already_existed {
        println!("✅ Database already existed");
    } else {
        println!("✅ Database created");
    }

    // Store a document under an id of our choosing
    let id = Uuid::new_v4().to_string();
    let doc = json!({
        "customer": "alice",
        "total": 42,
        "items": ["wrench", "socket set"],
    });
    let written = db.put(&id, &doc, None).await?;
    println!("📝 Stored document {} at revision {}", written.id, written.rev);

    // Read it back
    let fetched: serde_json::Value = db.get(&id, None).await?;
    println!("   customer: {}", fetched["customer"]);

    // Selector query
    let matches: Vec<serde_json::Value> = db
        .find(FindOptions::new(json!({"customer": "alice"})))
        .await?;
    println!("🔍 Found {} document(s) for alice", matches.len());

    println!("   {} document(s) total", db.count().await?);

    // Clean up: deletes need the current revision
    db.delete(&written.id, Some(&written.rev)).await?;
    db.delete_db().await?;
    println!("🧹 Cleaned up");

    Ok(())
}
