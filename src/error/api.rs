//! API call error taxonomy.
//!
//! Every failure of [`crate::api::ApiClient::execute`] is one of these
//! variants. Authentication expiry is classified from HTTP status codes
//! (401/403) only; application messages are carried verbatim and never
//! inspected for keywords.

use std::fmt;

use super::network::NetworkError;

/// Errors surfaced by a single logical API call.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Transport failure or timeout before any response arrived.
    Network(NetworkError),

    /// Response body was not the expected JSON envelope.
    MalformedResponse { status: u16, body_len: usize },

    /// Well-formed envelope with `success: false`; carries the server
    /// message verbatim.
    Application { message: String },

    /// The session is no longer authenticated: no refresh token was
    /// available, the refresh attempt failed, or the retried request was
    /// rejected again.
    AuthenticationRequired,
}

impl ApiError {
    /// Check if this error might be resolved by signing in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ApiError::AuthenticationRequired)
    }

    /// Check if the call may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(err) => err.user_message(),
            ApiError::MalformedResponse { status, .. } => {
                format!(
                    "The server returned an unreadable response (HTTP {}). Please try again.",
                    status
                )
            }
            ApiError::Application { message } => message.clone(),
            ApiError::AuthenticationRequired => {
                "Your session has expired. Please sign in again.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(err) => err.error_code(),
            ApiError::MalformedResponse { .. } => "E_API_MALFORMED",
            ApiError::Application { .. } => "E_API_APP",
            ApiError::AuthenticationRequired => "E_API_REAUTH",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(err) => write!(f, "{}", err),
            ApiError::MalformedResponse { status, body_len } => {
                write!(
                    f,
                    "Malformed response (HTTP {}, {} byte body)",
                    status, body_len
                )
            }
            ApiError::Application { message } => write!(f, "{}", message),
            ApiError::AuthenticationRequired => write!(f, "Authentication required"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NetworkError> for ApiError {
    fn from(err: NetworkError) -> Self {
        ApiError::Network(err)
    }
}
