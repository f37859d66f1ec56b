//! Single-flight access token refresh.
//!
//! Many concurrent requests can discover an expired access token at the
//! same time. The [`RefreshCoordinator`] guarantees that exactly one
//! token exchange runs per store instance: the first caller to find the
//! coordinator `Idle` starts the exchange, every caller that arrives
//! while it is `Refreshing` awaits the same published [`RefreshOutcome`].
//! The exchange runs on its own task so a caller that abandons its
//! request cannot cancel the refresh other waiters depend on, and the
//! store is updated before the outcome is published so retried requests
//! always see the new token.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use crate::api::envelope::{ApiEnvelope, RefreshGrant};
use crate::auth::credentials::{CredentialStore, UserProfile};
use crate::error::NetworkError;
use crate::traits::{Headers, HttpMethod, HttpRequest, HttpTransport, RequestBody};

/// Path of the token refresh endpoint.
pub const REFRESH_ENDPOINT: &str = "/api/auth/refresh-token";

/// Default deadline for the refresh network call.
pub const DEFAULT_REFRESH_DEADLINE: Duration = Duration::from_secs(10);

/// The shared result of a refresh attempt, observed identically by all
/// waiters.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The exchange succeeded; the store already holds the new token.
    Refreshed {
        access_token: String,
        user: Option<UserProfile>,
    },
    /// The exchange failed; the caller decides whether to terminate the
    /// session.
    Failed(RefreshFailure),
}

impl RefreshOutcome {
    /// Check whether the refresh succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed { .. })
    }
}

/// Why a refresh attempt failed.
#[derive(Debug, Clone)]
pub enum RefreshFailure {
    /// Transport failure before any response.
    Network(NetworkError),
    /// The exchange exceeded its deadline.
    TimedOut { deadline: Duration },
    /// The backend rejected the refresh token or returned an
    /// unusable response.
    Rejected { status: Option<u16>, message: String },
    /// The refreshed credential could not be committed to the store.
    Storage { message: String },
}

impl std::fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshFailure::Network(err) => write!(f, "refresh failed: {}", err),
            RefreshFailure::TimedOut { deadline } => {
                write!(f, "refresh timed out after {:?}", deadline)
            }
            RefreshFailure::Rejected { status, message } => match status {
                Some(status) => write!(f, "refresh rejected (HTTP {}): {}", status, message),
                None => write!(f, "refresh rejected: {}", message),
            },
            RefreshFailure::Storage { message } => {
                write!(f, "refreshed credential not committed: {}", message)
            }
        }
    }
}

/// Coordinator state machine: `Idle` until an exchange starts,
/// `Refreshing` while one is in flight.
enum RefreshState {
    Idle,
    Refreshing(watch::Receiver<Option<RefreshOutcome>>),
}

/// Single-flight refresh coordinator.
///
/// Constructed once per client session next to its [`CredentialStore`];
/// cloning shares the same in-flight state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    transport: Arc<dyn HttpTransport>,
    store: Arc<CredentialStore>,
    base_url: String,
    deadline: Duration,
    state: Arc<Mutex<RefreshState>>,
}

impl RefreshCoordinator {
    /// Create a coordinator with the default refresh deadline.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<CredentialStore>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            base_url: base_url.into(),
            deadline: DEFAULT_REFRESH_DEADLINE,
            state: Arc::new(Mutex::new(RefreshState::Idle)),
        }
    }

    /// Override the refresh deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Exchange the refresh token for a new access token, sharing the
    /// outcome with every concurrent caller.
    ///
    /// The first caller while `Idle` starts the exchange; callers that
    /// arrive while `Refreshing` never issue their own network call.
    pub async fn refresh(&self, refresh_token: &str) -> RefreshOutcome {
        let mut rx = {
            let mut state = self.state.lock().unwrap();
            match &*state {
                RefreshState::Refreshing(rx) => {
                    tracing::debug!("refresh already in flight, awaiting shared outcome");
                    rx.clone()
                }
                RefreshState::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = RefreshState::Refreshing(rx.clone());
                    self.spawn_exchange(refresh_token.to_string(), tx);
                    rx
                }
            }
        };

        loop {
            let published = rx.borrow_and_update().clone();
            if let Some(outcome) = published {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // Exchange task died without publishing.
                return RefreshOutcome::Failed(RefreshFailure::Rejected {
                    status: None,
                    message: "refresh ended without an outcome".to_string(),
                });
            }
        }
    }

    /// Run the exchange on its own task: an abandoned caller must not
    /// cancel the refresh for the other waiters.
    fn spawn_exchange(&self, refresh_token: String, tx: watch::Sender<Option<RefreshOutcome>>) {
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let url = format!("{}{}", self.base_url, REFRESH_ENDPOINT);
        let deadline = self.deadline;

        tokio::spawn(async move {
            let outcome =
                Self::exchange(transport.as_ref(), store.as_ref(), &url, &refresh_token, deadline)
                    .await;
            // Publish first, then reopen the gate; late arrivals either see
            // the resolved outcome or start a fresh exchange.
            let _ = tx.send(Some(outcome));
            *state.lock().unwrap() = RefreshState::Idle;
        });
    }

    async fn exchange(
        transport: &dyn HttpTransport,
        store: &CredentialStore,
        url: &str,
        refresh_token: &str,
        deadline: Duration,
    ) -> RefreshOutcome {
        tracing::info!("exchanging refresh token for a new access token");

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: Headers::new(),
            body: RequestBody::Json(serde_json::json!({ "refreshToken": refresh_token })),
            timeout: Some(deadline),
        };

        let response = match tokio::time::timeout(deadline, transport.send(request)).await {
            Err(_) => {
                tracing::warn!("refresh exchange exceeded its {:?} deadline", deadline);
                return RefreshOutcome::Failed(RefreshFailure::TimedOut { deadline });
            }
            Ok(Err(err)) => {
                let err = NetworkError::from_transport(&err, url);
                tracing::warn!("refresh exchange failed: {}", err);
                return RefreshOutcome::Failed(RefreshFailure::Network(err));
            }
            Ok(Ok(response)) => response,
        };

        let status = response.status;
        let envelope: ApiEnvelope = match response.json() {
            Ok(envelope) => envelope,
            Err(_) => {
                return RefreshOutcome::Failed(RefreshFailure::Rejected {
                    status: Some(status),
                    message: "unrecognized refresh response".to_string(),
                });
            }
        };

        if !response.is_success() || !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("HTTP {}", status));
            tracing::warn!(status, "refresh token rejected: {}", message);
            return RefreshOutcome::Failed(RefreshFailure::Rejected {
                status: Some(status),
                message,
            });
        }

        let grant: RefreshGrant = match envelope.data.map(serde_json::from_value) {
            Some(Ok(grant)) => grant,
            _ => {
                return RefreshOutcome::Failed(RefreshFailure::Rejected {
                    status: Some(status),
                    message: "refresh response carried no token".to_string(),
                });
            }
        };

        // The store must reflect the new token before any waiter proceeds.
        let updated = match store.get() {
            Some(current) => {
                let mut credential = current.with_access_token(&grant.access_token);
                if let Some(user) = grant.user.clone() {
                    credential.user = user;
                }
                credential
            }
            None => {
                // Logout raced the refresh; the cleared store is terminal.
                return RefreshOutcome::Failed(RefreshFailure::Storage {
                    message: "credential store cleared during refresh".to_string(),
                });
            }
        };
        if let Err(err) = store.set(updated).await {
            tracing::error!("failed to commit refreshed credential: {}", err);
            return RefreshOutcome::Failed(RefreshFailure::Storage {
                message: err.to_string(),
            });
        }

        tracing::info!("access token refreshed");
        RefreshOutcome::Refreshed {
            access_token: grant.access_token,
            user: grant.user,
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let refreshing = matches!(
            *self.state.lock().unwrap(),
            RefreshState::Refreshing(_)
        );
        f.debug_struct("RefreshCoordinator")
            .field("base_url", &self.base_url)
            .field("deadline", &self.deadline)
            .field("refreshing", &refreshing)
            .finish()
    }
}
