use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Serialize;

use daybed_core::ClientOptions;

use crate::Result;

/// The non-standard COPY verb; the server duplicates a document
/// server-side, targeting the id carried in the `Destination` header.
pub(crate) fn copy_method() -> Method {
    Method::from_bytes(b"COPY").expect("COPY is a valid method token")
}

/// One outbound request, described independently of the HTTP library
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }
}

/// What came back: status line plus raw body. Every status is delivered
/// here, including 4xx/5xx; classifying success is the caller's job.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl Response {
    /// The one success predicate every operation routes through
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP seam. The client takes a `Transport` at construction, so
/// credentials, proxying and (in tests) canned responses are controlled
/// per instance instead of through a process-wide client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request; `Err` only for connectivity or body-read
    /// failures, never for a delivered non-success status.
    async fn send(&self, request: Request) -> Result<Response>;

    /// Host identifier attached to surfaced database errors
    fn host(&self) -> &str;
}

/// Production transport over a dedicated reqwest client. Each instance
/// owns its connection pool, credentials and proxy settings.
pub struct ReqwestTransport {
    base_url: String,
    http: reqwest::Client,
    credentials: Option<(String, String)>,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, options: &ClientOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        let credentials = options
            .username
            .as_ref()
            .map(|user| (user.clone(), options.password.clone().unwrap_or_default()));

        let base_url: String = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
            credentials,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method, &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, Some(password));
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        // reqwest resolves 4xx/5xx to a normal response; only transport
        // failures surface as Err here
        let response = builder.send().await?;
        let status = response.status();
        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: response.text().await?,
        })
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
