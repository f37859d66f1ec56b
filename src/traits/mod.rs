//! Trait abstractions for dependency injection.
//!
//! These traits decouple the client core from concrete IO so tests can
//! swap in mocks from [`crate::adapters::mock`].

mod credentials;
mod http;

pub use credentials::{CredentialsPersistence, PersistenceError};
pub use http::{
    Headers, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartField,
    RequestBody,
};
