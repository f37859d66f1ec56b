//! Request context for one logical API call.

use std::time::Duration;

use crate::traits::{Headers, HttpMethod, MultipartField, RequestBody};

/// Description of one logical API call.
///
/// Immutable once constructed; the executor may replay it with an
/// updated Authorization header after a token refresh. Requests are
/// authenticated by default; opt out with [`RequestContext::unauthenticated`].
///
/// # Example
///
/// ```ignore
/// use bookline_client::api::RequestContext;
///
/// let list_leads = RequestContext::get("/api/leads");
/// let create = RequestContext::post("/api/bookings")
///     .with_json(serde_json::json!({"slot": "2026-09-12T10:00"}));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Endpoint path, appended to the client base URL
    pub endpoint: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request body
    pub body: RequestBody,
    /// Additional request headers
    pub headers: Headers,
    /// Whether a bearer token is attached
    pub requires_auth: bool,
    /// Caller-supplied timeout for this call
    pub timeout: Option<Duration>,
}

impl RequestContext {
    /// Create a context for the given method and endpoint.
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: RequestBody::Empty,
            headers: Headers::new(),
            requires_auth: true,
            timeout: None,
        }
    }

    /// GET request context.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    /// POST request context.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    /// PUT request context.
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, endpoint)
    }

    /// PATCH request context.
    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, endpoint)
    }

    /// DELETE request context.
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Attach a multipart form body.
    ///
    /// No Content-Type header is set; the transport owns the boundary.
    pub fn with_multipart(mut self, fields: Vec<MultipartField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a caller-supplied timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Mark this call as not requiring a bearer token.
    pub fn unauthenticated(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Check whether this context carries a multipart body.
    pub fn is_multipart(&self) -> bool {
        self.body.is_multipart()
    }
}
