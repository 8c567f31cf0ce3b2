//! Reconciliation of configured design documents against the server.

use std::collections::HashMap;

use reqwest::Method;

use daybed_core::config::{DesignDocConfig, ViewConfig};
use daybed_core::models::{DesignDocument, ViewDefinition};

use crate::client::Database;
use crate::transport::Request;

/// Bring one design document in line with its configuration.
///
/// Best-effort by contract: fetch and write failures are logged and
/// leave the rest of the bootstrap untouched. A missing document is a
/// normal first-run state, not a failure. When every desired view is
/// already present verbatim, nothing is written, which is what makes
/// running bootstrap on every startup safe.
pub(crate) async fn reconcile_design_doc(db: &Database, config: &DesignDocConfig) {
    let path = format!("{}/_design/{}", db.name(), config.name);

    let response = match db.send(Request::new(Method::GET, path.clone())).await {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(design_doc = %config.name, %error, "Skipping design document, fetch failed");
            return;
        }
    };

    let mut current = if response.status == 404 {
        DesignDocument::shell(&config.name)
    } else if response.is_success() {
        match serde_json::from_str::<DesignDocument>(&response.body) {
            Ok(doc) => doc,
            Err(error) => {
                tracing::warn!(design_doc = %config.name, %error, "Skipping design document, response did not parse");
                return;
            }
        }
    } else {
        tracing::warn!(
            design_doc = %config.name,
            status = response.status,
            "Skipping design document, fetch returned non-success"
        );
        return;
    };

    if !stage_views(&mut current.views, &config.views) {
        tracing::debug!(design_doc = %config.name, "Design document already up to date");
        return;
    }

    let request = match Request::new(Method::PUT, path).json(&current) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(design_doc = %config.name, %error, "Skipping design document, body did not serialize");
            return;
        }
    };

    match db.send(request).await {
        Ok(response) if response.is_success() => {
            tracing::info!(design_doc = %config.name, "Design document updated");
        }
        Ok(response) => {
            tracing::warn!(
                design_doc = %config.name,
                status = response.status,
                body = %response.body,
                "Design document write rejected"
            );
        }
        Err(error) => {
            tracing::warn!(design_doc = %config.name, %error, "Design document write failed");
        }
    }
}

/// Merge the desired views into the existing map, returning whether
/// anything changed. Comparison is exact string equality on map and
/// reduce. Views present on the server but absent from the desired set
/// are kept untouched.
fn stage_views(existing: &mut HashMap<String, ViewDefinition>, desired: &[ViewConfig]) -> bool {
    let mut dirty = false;
    for view in desired {
        let definition = view.definition();
        if existing.get(&view.name) != Some(&definition) {
            existing.insert(view.name.clone(), definition);
            dirty = true;
        }
    }
    dirty
}
