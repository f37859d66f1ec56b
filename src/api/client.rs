//! API client: the request executor.
//!
//! [`ApiClient::execute`] runs one logical call against the Bookline
//! backend: attach the current bearer token, dispatch, and on a 401/403
//! coordinate a single-flight token refresh, replaying the request at
//! most once. Unrecoverable authentication failures escalate to the
//! [`SessionTerminator`] and surface as
//! [`ApiError::AuthenticationRequired`].

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ReqwestTransport;
use crate::api::envelope::ApiEnvelope;
use crate::api::request::RequestContext;
use crate::auth::credentials::CredentialStore;
use crate::auth::refresh::{RefreshCoordinator, RefreshOutcome, DEFAULT_REFRESH_DEADLINE};
use crate::auth::session::SessionTerminator;
use crate::error::{ApiError, NetworkError};
use crate::traits::{HttpRequest, HttpResponse, HttpTransport};

/// Default base URL for the Bookline API.
pub const DEFAULT_BASE_URL: &str = "https://api.bookline.app";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all endpoint paths are appended to
    pub base_url: String,
    /// Deadline for the token refresh exchange
    pub refresh_deadline: Duration,
}

impl ClientConfig {
    /// Configuration for a custom base URL with default settings.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_deadline: DEFAULT_REFRESH_DEADLINE,
        }
    }
}

/// Authenticated client for the Bookline REST API.
///
/// One instance per session, shared (via `Arc`) by every call site. The
/// credential store and refresh coordinator are constructed once and
/// injected everywhere they are needed; there is no global state.
///
/// # Example
///
/// ```ignore
/// use bookline_client::api::{ApiClient, ClientConfig, RequestContext};
/// use bookline_client::auth::CredentialStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(CredentialStore::new());
/// let client = ApiClient::with_reqwest(ClientConfig::default(), store);
/// let leads = client.execute(RequestContext::get("/api/leads")).await?;
/// ```
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    store: Arc<CredentialStore>,
    refresher: RefreshCoordinator,
    terminator: Arc<SessionTerminator>,
}

impl ApiClient {
    /// Create a client over the given transport and store.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<CredentialStore>,
    ) -> Self {
        let refresher = RefreshCoordinator::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            config.base_url.clone(),
        )
        .with_deadline(config.refresh_deadline);
        let terminator = Arc::new(SessionTerminator::new(Arc::clone(&store)));
        Self {
            base_url: config.base_url,
            transport,
            store,
            refresher,
            terminator,
        }
    }

    /// Create a client backed by the production reqwest transport.
    pub fn with_reqwest(config: ClientConfig, store: Arc<CredentialStore>) -> Self {
        Self::new(config, Arc::new(ReqwestTransport::new()), store)
    }

    /// The credential store this client reads from.
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// The session terminator; collaborators register logout observers
    /// here.
    pub fn terminator(&self) -> &Arc<SessionTerminator> {
        &self.terminator
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute one logical API call.
    ///
    /// Returns the envelope's `data` unchanged on success. On 401/403
    /// with a refresh token available, refreshes (single-flight) and
    /// replays the request exactly once; any further authentication
    /// failure terminates the session and fails with
    /// [`ApiError::AuthenticationRequired`].
    pub async fn execute(&self, context: RequestContext) -> Result<serde_json::Value, ApiError> {
        let mut token = if context.requires_auth {
            self.store.get().map(|credential| credential.access_token)
        } else {
            None
        };
        let mut retried = false;

        loop {
            let response = self.dispatch(&context, token.as_deref()).await?;

            if context.requires_auth && matches!(response.status, 401 | 403) {
                if retried {
                    tracing::warn!(
                        endpoint = %context.endpoint,
                        "still unauthorized after refresh, terminating session"
                    );
                    self.terminator.terminate().await;
                    return Err(ApiError::AuthenticationRequired);
                }

                let refresh_token = self
                    .store
                    .get()
                    .filter(|credential| credential.has_refresh_token())
                    .map(|credential| credential.refresh_token);
                let Some(refresh_token) = refresh_token else {
                    tracing::warn!(
                        endpoint = %context.endpoint,
                        "unauthorized with no refresh token available"
                    );
                    self.terminator.terminate().await;
                    return Err(ApiError::AuthenticationRequired);
                };

                match self.refresher.refresh(&refresh_token).await {
                    RefreshOutcome::Refreshed { access_token, .. } => {
                        tracing::debug!(
                            endpoint = %context.endpoint,
                            "token refreshed, replaying request"
                        );
                        token = Some(access_token);
                        retried = true;
                        continue;
                    }
                    RefreshOutcome::Failed(failure) => {
                        tracing::warn!(endpoint = %context.endpoint, "{}", failure);
                        self.terminator.terminate().await;
                        return Err(ApiError::AuthenticationRequired);
                    }
                }
            }

            return Self::parse_envelope(&response);
        }
    }

    async fn dispatch(
        &self,
        context: &RequestContext,
        token: Option<&str>,
    ) -> Result<HttpResponse, ApiError> {
        let url = format!("{}{}", self.base_url, context.endpoint);
        let mut headers = context.headers.clone();
        if let Some(token) = token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }

        let request = HttpRequest {
            method: context.method,
            url: url.clone(),
            headers,
            body: context.body.clone(),
            timeout: context.timeout,
        };

        self.transport
            .send(request)
            .await
            .map_err(|err| ApiError::Network(NetworkError::from_transport(&err, &url)))
    }

    fn parse_envelope(response: &HttpResponse) -> Result<serde_json::Value, ApiError> {
        let envelope: ApiEnvelope = match response.json() {
            Ok(envelope) => envelope,
            Err(_) => {
                return Err(ApiError::MalformedResponse {
                    status: response.status,
                    body_len: response.body.len(),
                });
            }
        };

        if !response.is_success() || !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(ApiError::Application { message });
        }

        Ok(envelope.data.unwrap_or(serde_json::Value::Null))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
