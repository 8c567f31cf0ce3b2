use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use daybed_core::config::ClientOptions;
use daybed_core::models::{
    BulkDocResult, CreateDbResult, DbInfo, FindOptions, FindResult, ListOptions, ListResult,
    RevisionInfo, ViewResult, WriteResult,
};

use crate::params;
use crate::transport::{copy_method, ReqwestTransport, Request, Response, Transport};
use crate::{Error, Result};

/// A typed client bound to one named database.
///
/// Holds only configuration: the transport and the database name.
/// Nothing is cached and no session state exists; every operation is one
/// fresh HTTP round trip, so the client is freely shareable across
/// tasks.
pub struct Database {
    name: String,
    transport: Arc<dyn Transport>,
    warnings: bool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Connect to `base_url` with a dedicated transport built from the
    /// given options
    pub fn new(
        base_url: impl Into<String>,
        name: impl Into<String>,
        options: &ClientOptions,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(base_url, options)?);
        Ok(Self::with_transport(transport, name, options.warnings))
    }

    /// Bind to an already-constructed transport
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        name: impl Into<String>,
        warnings: bool,
    ) -> Self {
        Self {
            name: name.into(),
            transport,
            warnings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) async fn send(&self, request: Request) -> Result<Response> {
        self.transport.send(request).await
    }

    /// Shared error construction: status, status text, response body and
    /// originating host travel with every surfaced database error.
    pub(crate) fn failure(&self, response: Response) -> Error {
        Error::Database {
            status: response.status,
            status_text: response.status_text,
            body: response.body,
            host: self.transport.host().to_string(),
        }
    }

    fn warn(&self, message: &str) {
        if self.warnings {
            tracing::warn!("{}", message);
        }
    }

    fn doc_path(&self, id: &str) -> String {
        format!("{}/{}", self.name, id)
    }

    async fn request_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(self.failure(response));
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    async fn request_unit(&self, request: Request) -> Result<()> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(self.failure(response));
        }
        Ok(())
    }

    /// Fetch a document by id, optionally at a specific revision. A
    /// missing document is an error carrying status 404.
    pub async fn get<T: DeserializeOwned>(&self, id: &str, rev: Option<&str>) -> Result<T> {
        let mut request = Request::new(Method::GET, self.doc_path(id));
        if let Some(rev) = rev {
            request = request.param("rev", rev);
        }
        self.request_json(request).await
    }

    /// Store a new document, letting the server assign its id
    pub async fn post<T: Serialize>(&self, doc: &T) -> Result<WriteResult> {
        let request = Request::new(Method::POST, self.name.clone()).json(doc)?;
        self.request_json(request).await
    }

    /// Write a document at a known id. The current revision is what
    /// prevents lost updates; a write without one is still attempted,
    /// but the server rejects it with a conflict whenever the document
    /// already exists.
    pub async fn put<T: Serialize>(
        &self,
        id: &str,
        doc: &T,
        rev: Option<&str>,
    ) -> Result<WriteResult> {
        let mut request = Request::new(Method::PUT, self.doc_path(id)).json(doc)?;
        match rev {
            Some(rev) => request = request.param("rev", rev),
            None => self.warn(&format!(
                "daybed: no revision given for put of document {}; the write will conflict if the document exists",
                id
            )),
        }
        self.request_json(request).await
    }

    /// Delete a document; same revision policy as `put`
    pub async fn delete(&self, id: &str, rev: Option<&str>) -> Result<()> {
        let mut request = Request::new(Method::DELETE, self.doc_path(id));
        match rev {
            Some(rev) => request = request.param("rev", rev),
            None => self.warn(&format!(
                "daybed: no revision given for delete of document {}; the write will conflict if the document exists",
                id
            )),
        }
        self.request_unit(request).await
    }

    /// Duplicate a document server-side under a new id
    pub async fn copy(&self, id: &str, new_id: &str) -> Result<WriteResult> {
        let request = Request::new(copy_method(), self.doc_path(id)).header("Destination", new_id);
        self.request_json(request).await
    }

    /// HEAD-based existence probe; a 404 is `false`, not an error
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let response = self
            .send(Request::new(Method::HEAD, self.doc_path(id)))
            .await?;
        Ok(response.is_success())
    }

    /// Check whether any document carries `value` in `field`. The
    /// reserved `_id` field short-circuits to a HEAD probe; any other
    /// field costs a selector query with `limit = 1`.
    pub async fn exists_by_field_value(&self, value: &Value, field: &str) -> Result<bool> {
        if field == "_id" {
            return match value.as_str() {
                Some(id) => self.exists(id).await,
                None => Ok(false),
            };
        }
        let mut selector = serde_json::Map::new();
        selector.insert(field.to_string(), value.clone());
        self.exists_by_selector(Value::Object(selector)).await
    }

    /// Check whether any document matches the selector
    pub async fn exists_by_selector(&self, selector: Value) -> Result<bool> {
        let mut options = FindOptions::new(selector);
        options.limit = Some(1);
        let docs: Vec<Value> = self.find(options).await?;
        Ok(!docs.is_empty())
    }

    /// Run a selector query. Server-side advisories (for instance a
    /// selector with no matching index) are surfaced through the
    /// warning sink when enabled.
    pub async fn find<T: DeserializeOwned>(&self, options: FindOptions) -> Result<Vec<T>> {
        let request = Request::new(Method::POST, format!("{}/_find", self.name)).json(&options)?;
        let result: FindResult<T> = self.request_json(request).await?;
        if let Some(warning) = &result.warning {
            self.warn(&format!("daybed: server warned on find: {}", warning));
        }
        Ok(result.docs)
    }

    async fn all_docs(&self, mut options: ListOptions, include_docs: bool) -> Result<ViewResult> {
        options.include_docs = Some(include_docs);
        let request = Request::new(Method::GET, format!("{}/_all_docs", self.name))
            .query(params::to_query_pairs(&options)?);
        self.request_json(request).await
    }

    /// List rows without document bodies; each row reduces to its
    /// revision. `include_docs` is forced off regardless of the options.
    pub async fn list_without_docs(
        &self,
        options: Option<ListOptions>,
    ) -> Result<ListResult<RevisionInfo>> {
        let result = self.all_docs(options.unwrap_or_default(), false).await?;
        let rows = result
            .rows
            .into_iter()
            .map(|row| serde_json::from_value(row.value).map_err(Error::from))
            .collect::<Result<Vec<RevisionInfo>>>()?;
        Ok(ListResult {
            offset: result.offset.unwrap_or(0),
            total_rows: result.total_rows.unwrap_or(0),
            rows,
        })
    }

    /// List full documents; `include_docs` is forced on regardless of
    /// the options.
    pub async fn list_with_docs<T: DeserializeOwned>(
        &self,
        options: Option<ListOptions>,
    ) -> Result<ListResult<T>> {
        let result = self.all_docs(options.unwrap_or_default(), true).await?;
        let rows = result
            .rows
            .into_iter()
            .map(|row| serde_json::from_value(row.doc.unwrap_or(Value::Null)).map_err(Error::from))
            .collect::<Result<Vec<T>>>()?;
        Ok(ListResult {
            offset: result.offset.unwrap_or(0),
            total_rows: result.total_rows.unwrap_or(0),
            rows,
        })
    }

    /// Total number of documents, read from a zero-limit listing
    pub async fn count(&self) -> Result<u64> {
        let options = ListOptions {
            limit: Some(0),
            ..Default::default()
        };
        let result = self.all_docs(options, false).await?;
        Ok(result.total_rows.unwrap_or(0))
    }

    /// Count the documents matching a selector.
    ///
    /// This pulls the matching ids onto the client, which gets
    /// memory-expensive for large result sets. Put a map/reduce view in
    /// front of high-cardinality counts instead.
    pub async fn count_by_selector(&self, selector: Value) -> Result<u64> {
        let mut options = FindOptions::new(selector);
        options.fields = Some(vec!["_id".to_string()]);
        let docs: Vec<Value> = self.find(options).await?;
        Ok(docs.len() as u64)
    }

    /// Execute a view from a design document
    pub async fn view(
        &self,
        design_doc: &str,
        view: &str,
        options: Option<ListOptions>,
    ) -> Result<ViewResult> {
        let request = Request::new(
            Method::GET,
            format!("{}/_design/{}/_view/{}", self.name, design_doc, view),
        )
        .query(params::to_query_pairs(&options.unwrap_or_default())?);
        self.request_json(request).await
    }

    /// Write a batch of documents in one request. The returned vector is
    /// positionally aligned with the input; a rejected document shows up
    /// as a `Failure` element and never fails the batch.
    pub async fn bulk<T: Serialize>(&self, docs: &[T]) -> Result<Vec<BulkDocResult>> {
        let request = Request::new(Method::POST, format!("{}/_bulk_docs", self.name))
            .json(&json!({ "docs": docs }))?;
        self.request_json(request).await
    }

    /// Create the database. An already-existing database (412) is
    /// success, flagged as `already_existed`.
    pub async fn create_db(&self) -> Result<CreateDbResult> {
        let response = self.send(Request::new(Method::PUT, self.name.clone())).await?;
        if response.status == 412 {
            return Ok(CreateDbResult {
                ok: true,
                already_existed: true,
            });
        }
        if !response.is_success() {
            return Err(self.failure(response));
        }
        Ok(CreateDbResult {
            ok: true,
            already_existed: false,
        })
    }

    /// Delete the database and everything in it
    pub async fn delete_db(&self) -> Result<()> {
        self.request_unit(Request::new(Method::DELETE, self.name.clone()))
            .await
    }

    /// Database-level metadata
    pub async fn get_db_info(&self) -> Result<DbInfo> {
        self.request_json(Request::new(Method::GET, self.name.clone()))
            .await
    }

    /// Create a JSON index over the given fields, named after the
    /// database. The server treats re-creation as a no-op.
    pub async fn create_index(&self, fields: &[String]) -> Result<()> {
        let body = json!({
            "index": { "fields": fields },
            "name": format!("{}-indexes", self.name),
        });
        let request = Request::new(Method::POST, format!("{}/_index", self.name)).json(&body)?;
        self.request_unit(request).await
    }
}
