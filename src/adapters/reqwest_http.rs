//! Reqwest-based HTTP transport adapter.
//!
//! Production implementation of the [`HttpTransport`] trait from
//! `crate::traits`, wrapping a `reqwest::Client`.

use async_trait::async_trait;

use crate::traits::{
    Headers, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody,
};

/// HTTP transport implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use bookline_client::adapters::ReqwestTransport;
/// use bookline_client::traits::HttpTransport;
///
/// let transport = ReqwestTransport::new();
/// let response = transport.send(request).await?;
/// println!("Status: {}", response.status);
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new transport with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport over a custom `reqwest::Client`.
    ///
    /// This allows advanced configuration like custom timeouts,
    /// connection pools, or TLS settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying `reqwest::Client`.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Convert a reqwest error to an HttpError.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Convert reqwest headers to our Headers type.
    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .client
            .request(Self::convert_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(fields) => {
                // Boundary and Content-Type belong to reqwest here.
                let mut form = reqwest::multipart::Form::new();
                for field in fields {
                    let mut part = reqwest::multipart::Part::bytes(field.data.to_vec());
                    if let Some(file_name) = field.file_name {
                        part = part.file_name(file_name);
                    }
                    if let Some(content_type) = field.content_type {
                        part = part
                            .mime_str(&content_type)
                            .map_err(|e| HttpError::Other(e.to_string()))?;
                    }
                    form = form.part(field.name, part);
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response.bytes().await.map_err(Self::convert_error)?;

        Ok(HttpResponse::with_headers(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_to(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Headers::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    #[test]
    fn test_reqwest_transport_new() {
        let transport = ReqwestTransport::new();
        let _inner = transport.inner();
    }

    #[test]
    fn test_reqwest_transport_default_and_clone() {
        let transport = ReqwestTransport::default();
        let cloned = transport.clone();
        let _ = cloned.inner();
    }

    #[test]
    fn test_reqwest_transport_with_custom_client() {
        let custom = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap();
        let transport = ReqwestTransport::with_client(custom);
        let _ = transport.inner();
    }

    #[test]
    fn test_convert_method() {
        assert_eq!(
            ReqwestTransport::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestTransport::convert_method(HttpMethod::Patch),
            reqwest::Method::PATCH
        );
    }

    #[test]
    fn test_convert_headers() {
        let mut header_map = reqwest::header::HeaderMap::new();
        header_map.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        header_map.insert(reqwest::header::CONTENT_LENGTH, "100".parse().unwrap());

        let headers = ReqwestTransport::convert_headers(&header_map);
        assert_eq!(
            headers.get("content-type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(headers.get("content-length"), Some(&"100".to_string()));
    }

    #[tokio::test]
    async fn test_send_invalid_url() {
        let transport = ReqwestTransport::new();
        let result = transport.send(request_to("not-a-valid-url")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_send_connection_refused() {
        let transport = ReqwestTransport::new();
        // A port that's unlikely to be in use
        let result = transport
            .send(request_to("http://127.0.0.1:59999/test"))
            .await;
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(matches!(
                e,
                HttpError::ConnectionFailed(_) | HttpError::Other(_)
            ));
        }
    }
}
