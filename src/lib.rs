//! Bookline client core - resilient, authenticated access to the
//! Bookline REST API.
//!
//! The hard problem this crate solves is credential lifecycle management
//! under concurrency: many concurrent requests share one access token,
//! and when it expires they all discover it at once. The client
//! guarantees that exactly one refresh runs ([`auth::RefreshCoordinator`]),
//! that every waiter observes its outcome, and that an unrecoverable
//! authentication failure terminates the session exactly once
//! ([`auth::SessionTerminator`]).
//!
//! Construct one [`auth::CredentialStore`] and one [`api::ApiClient`]
//! per session and share them across call sites; login and logout are
//! owned by the application, which mutates the store directly.

pub mod adapters;
pub mod api;
pub mod auth;
pub mod error;
pub mod traits;
