//! Concrete implementations of the trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestTransport`] - HTTP transport using reqwest
//! - [`FileCredentialsStore`] - File-based credential persistence
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockTransport`] - Queued per-route replies, recorded requests
//! - [`mock::InMemoryPersistence`] - In-memory credential storage

pub mod file_credentials;
pub mod mock;
pub mod reqwest_http;

pub use file_credentials::FileCredentialsStore;
pub use mock::{InMemoryPersistence, MockTransport};
pub use reqwest_http::ReqwestTransport;
