//! HTTP transport trait abstraction.
//!
//! Provides a trait-based abstraction for HTTP dispatch, enabling
//! dependency injection and mocking in tests. The executor replays
//! requests with a fresh Authorization header, so the transport works
//! on a fully described [`HttpRequest`] rather than per-verb methods.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// HTTP methods the client dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// The canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named part of a multipart form body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartField {
    /// Form field name
    pub name: String,
    /// Raw part payload
    pub data: Bytes,
    /// File name, for file parts
    pub file_name: Option<String>,
    /// MIME type of the part, if known
    pub content_type: Option<String>,
}

impl MultipartField {
    /// Create a plain text form field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Bytes::from(value.into().into_bytes()),
            file_name: None,
            content_type: None,
        }
    }

    /// Create a file part with a file name and optional MIME type.
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            file_name: Some(file_name.into()),
            content_type,
        }
    }
}

/// Request body forms the client can dispatch.
///
/// Multipart bodies never carry an explicit Content-Type header; the
/// boundary belongs to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON body, sent as `application/json`
    Json(serde_json::Value),
    /// Multipart form body
    Multipart(Vec<MultipartField>),
}

impl RequestBody {
    /// Check whether this body is a multipart form.
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }

    /// Check whether this body is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// A fully described HTTP request, ready for dispatch.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: RequestBody,
    /// Per-request timeout, when the caller supplied one
    pub timeout: Option<Duration>,
}

/// HTTP response wrapper.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a new response.
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Create a new response with headers.
    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as a string.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP transport errors.
#[derive(Debug, Clone)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// IO error while reading the response
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP dispatch.
///
/// This trait abstracts the wire so the client core can be exercised
/// against the production reqwest transport or a mock in tests.
///
/// # Example
///
/// ```ignore
/// use bookline_client::traits::{HttpTransport, HttpRequest, HttpMethod, RequestBody, Headers};
///
/// async fn ping<T: HttpTransport>(transport: &T) -> Result<u16, HttpError> {
///     let request = HttpRequest {
///         method: HttpMethod::Get,
///         url: "https://api.example.com/health".to_string(),
///         headers: Headers::new(),
///         body: RequestBody::Empty,
///         timeout: None,
///     };
///     Ok(transport.send(request).await?.status)
/// }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Dispatch a single request and collect the full response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
        assert_eq!(format!("{}", HttpMethod::Post), "POST");
    }

    #[test]
    fn test_multipart_field_text() {
        let field = MultipartField::text("title", "Autumn open day");
        assert_eq!(field.name, "title");
        assert_eq!(field.data, Bytes::from("Autumn open day"));
        assert!(field.file_name.is_none());
        assert!(field.content_type.is_none());
    }

    #[test]
    fn test_multipart_field_file() {
        let field = MultipartField::file(
            "photo",
            "venue.jpg",
            Some("image/jpeg".to_string()),
            vec![0xff, 0xd8],
        );
        assert_eq!(field.name, "photo");
        assert_eq!(field.file_name, Some("venue.jpg".to_string()));
        assert_eq!(field.content_type, Some("image/jpeg".to_string()));
        assert_eq!(field.data.len(), 2);
    }

    #[test]
    fn test_request_body_predicates() {
        assert!(RequestBody::Empty.is_empty());
        assert!(!RequestBody::Empty.is_multipart());
        assert!(RequestBody::Multipart(vec![]).is_multipart());
        assert!(!RequestBody::Json(serde_json::json!({})).is_multipart());
    }

    #[test]
    fn test_response_new() {
        let response = HttpResponse::new(200, Bytes::from("Hello"));
        assert_eq!(response.status, 200);
        assert!(response.headers.is_empty());
        assert_eq!(response.body, Bytes::from("Hello"));
    }

    #[test]
    fn test_response_with_headers() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = HttpResponse::with_headers(200, headers, Bytes::from("{}"));
        assert_eq!(
            response.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_response_is_success() {
        assert!(HttpResponse::new(200, Bytes::new()).is_success());
        assert!(HttpResponse::new(204, Bytes::new()).is_success());
        assert!(HttpResponse::new(299, Bytes::new()).is_success());
        assert!(!HttpResponse::new(300, Bytes::new()).is_success());
        assert!(!HttpResponse::new(401, Bytes::new()).is_success());
        assert!(!HttpResponse::new(500, Bytes::new()).is_success());
    }

    #[test]
    fn test_response_text_and_json() {
        let response = HttpResponse::new(200, Bytes::from(r#"{"id":7}"#));
        assert_eq!(response.text().unwrap(), r#"{"id":7}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            HttpError::Timeout("10s".to_string()).to_string(),
            "Request timeout: 10s"
        );
        assert_eq!(
            HttpError::Io("read failed".to_string()).to_string(),
            "IO error: read failed"
        );
        assert_eq!(
            HttpError::InvalidUrl("bad url".to_string()).to_string(),
            "Invalid URL: bad url"
        );
        assert_eq!(
            HttpError::Other("unknown".to_string()).to_string(),
            "HTTP error: unknown"
        );
    }
}
