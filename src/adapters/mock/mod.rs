//! Test doubles for the transport and persistence traits.

pub mod credentials;
pub mod http;

pub use credentials::InMemoryPersistence;
pub use http::{MockTransport, RecordedRequest};
