//! Mock HTTP transport for testing.
//!
//! Provides a configurable transport that serves queued replies per
//! route and records every dispatched request for verification. Routes
//! are keyed by method and path, so the same endpoint can answer 401
//! first and 200 on the replay.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{
    Headers, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody,
};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Full request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: RequestBody,
}

/// A configured reply.
#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    Error(HttpError),
}

/// Mock HTTP transport for testing.
///
/// Replies are queued per `(method, path)` route; when a queue is down
/// to its last entry that entry keeps being served, so a single
/// configured response answers any number of calls while sequences
/// (401 then 200) drain in order.
///
/// # Example
///
/// ```ignore
/// use bookline_client::adapters::mock::MockTransport;
/// use bookline_client::traits::HttpMethod;
///
/// let transport = MockTransport::new();
/// transport.push_response(
///     HttpMethod::Get,
///     "/api/leads",
///     MockTransport::json(200, serde_json::json!({"success": true, "data": []})),
/// );
///
/// // ... drive the client, then verify:
/// assert_eq!(transport.requests_to("/api/leads"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    /// Queued replies by route
    replies: Arc<Mutex<HashMap<String, VecDeque<MockReply>>>>,
    /// Fallback reply when no route matches
    default_reply: Arc<Mutex<Option<MockReply>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Artificial delay before every reply
    latency: Arc<Mutex<Option<Duration>>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(HashMap::new())),
            default_reply: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Build a JSON response with the given status.
    pub fn json(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse::new(status, bytes::Bytes::from(body.to_string()))
    }

    /// Queue a response for a route.
    pub fn push_response(&self, method: HttpMethod, path: &str, response: HttpResponse) {
        self.push_reply(method, path, MockReply::Response(response));
    }

    /// Queue a transport error for a route.
    pub fn push_error(&self, method: HttpMethod, path: &str, error: HttpError) {
        self.push_reply(method, path, MockReply::Error(error));
    }

    /// Set a fallback response for unmatched routes.
    pub fn set_default_response(&self, response: HttpResponse) {
        *self.default_reply.lock().unwrap() = Some(MockReply::Response(response));
    }

    /// Delay every reply, to widen race windows in concurrency tests or
    /// exercise deadlines.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// All recorded requests, in dispatch order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests whose path matches.
    pub fn requests_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| Self::path_of(&request.url) == path)
            .count()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn push_reply(&self, method: HttpMethod, path: &str, reply: MockReply) {
        let mut replies = self.replies.lock().unwrap();
        replies
            .entry(Self::route_key(method, path))
            .or_default()
            .push_back(reply);
    }

    fn route_key(method: HttpMethod, path: &str) -> String {
        format!("{} {}", method, path)
    }

    /// Path portion of a URL, with scheme/host and query stripped.
    fn path_of(url: &str) -> &str {
        let after_scheme = match url.find("://") {
            Some(idx) => &url[idx + 3..],
            None => url,
        };
        let path = match after_scheme.find('/') {
            Some(idx) => &after_scheme[idx..],
            None => "/",
        };
        match path.find('?') {
            Some(idx) => &path[..idx],
            None => path,
        }
    }

    fn next_reply(&self, method: HttpMethod, url: &str) -> Option<MockReply> {
        let key = Self::route_key(method, Self::path_of(url));
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            // The last reply stays in place for repeated calls.
            queue.front().cloned()
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        });

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let reply = self
            .next_reply(request.method, &request.url)
            .or_else(|| self.default_reply.lock().unwrap().clone());

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(error)) => Err(error),
            None => Err(HttpError::Other(format!(
                "no mock reply configured for {} {}",
                request.method, request.url
            ))),
        }
    }
}
