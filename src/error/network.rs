//! Network-related error types.
//!
//! Classifies transport failures that occur before any usable response
//! arrives: connections, timeouts, TLS.

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    Timeout { operation: String, message: String },

    /// TLS/SSL error.
    TlsError { message: String },

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::TlsError { .. } => false, // Usually config issue
            NetworkError::Other { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check your internet connection."
                    .to_string()
            }
            NetworkError::Timeout { operation, .. } => {
                format!(
                    "The {} operation timed out. The server may be slow or unreachable.",
                    operation
                )
            }
            NetworkError::TlsError { .. } => {
                "A secure connection could not be established. Please check your system's SSL/TLS configuration.".to_string()
            }
            NetworkError::Other { message } => {
                format!("Network error: {}", message)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::TlsError { .. } => "E_NET_TLS",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }

    /// Classify a transport error into a NetworkError.
    pub fn from_transport(err: &HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: url.to_string(),
                message: message.clone(),
            },
            HttpError::Timeout(message) => NetworkError::Timeout {
                operation: "HTTP request".to_string(),
                message: message.clone(),
            },
            HttpError::Io(message) | HttpError::InvalidUrl(message) => NetworkError::Other {
                message: message.clone(),
            },
            HttpError::Other(message) => {
                let lower = message.to_lowercase();
                if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate")
                {
                    NetworkError::TlsError {
                        message: message.clone(),
                    }
                } else {
                    NetworkError::Other {
                        message: message.clone(),
                    }
                }
            }
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation, message } => {
                write!(f, "{} timed out: {}", operation, message)
            }
            NetworkError::TlsError { message } => {
                write!(f, "TLS error: {}", message)
            }
            NetworkError::Other { message } => {
                write!(f, "Network error: {}", message)
            }
        }
    }
}

impl std::error::Error for NetworkError {}
