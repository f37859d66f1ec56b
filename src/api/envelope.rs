//! Backend response envelope.
//!
//! Every Bookline endpoint replies with
//! `{"success": bool, "data"?: any, "message"?: string}`; camelCase on
//! the wire.

use serde::Deserialize;

use crate::auth::credentials::UserProfile;

/// The standard response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    /// Whether the operation succeeded
    pub success: bool,
    /// Operation payload, when present
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Server-supplied message, usually set on failure
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of a successful refresh (`data` of the refresh envelope).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshGrant {
    /// The new access token
    pub access_token: String,
    /// Updated user profile, when the backend includes one
    #[serde(default)]
    pub user: Option<UserProfile>,
}
