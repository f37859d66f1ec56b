//! Error handling for the Bookline client.
//!
//! Two layers: [`NetworkError`] classifies transport failures, and
//! [`ApiError`] is the taxonomy every API call resolves to. Both carry
//! retryability hints, user-facing messages, and short codes for
//! logging.

mod api;
mod network;

pub use api::ApiError;
pub use network::NetworkError;
