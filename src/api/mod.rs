//! API surface: request contexts, the response envelope, and the
//! executing client.

pub mod client;
pub mod envelope;
pub mod request;

pub use client::{ApiClient, ClientConfig, DEFAULT_BASE_URL};
pub use envelope::{ApiEnvelope, RefreshGrant};
pub use request::RequestContext;
