//! Credential persistence trait abstraction.
//!
//! Provides a trait-based abstraction for durable credential storage,
//! enabling dependency injection and mocking in tests.

use async_trait::async_trait;

use crate::auth::credentials::Credential;

/// Persistence operation errors.
#[derive(Debug, Clone)]
pub enum PersistenceError {
    /// Failed to load the stored credential
    LoadFailed(String),
    /// Failed to save the credential
    SaveFailed(String),
    /// Failed to clear the stored credential
    ClearFailed(String),
    /// IO error
    Io(String),
    /// Serialization/deserialization error
    Serialization(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::LoadFailed(msg) => write!(f, "Failed to load credential: {}", msg),
            PersistenceError::SaveFailed(msg) => write!(f, "Failed to save credential: {}", msg),
            PersistenceError::ClearFailed(msg) => write!(f, "Failed to clear credential: {}", msg),
            PersistenceError::Io(msg) => write!(f, "IO error: {}", msg),
            PersistenceError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            PersistenceError::Other(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Trait for durable credential storage.
///
/// The credential store writes through an implementation of this trait
/// before committing a mutation in memory, so a failed backend write
/// leaves the previous state intact. Implementations include the
/// production file-based store and an in-memory mock for tests.
#[async_trait]
pub trait CredentialsPersistence: Send + Sync {
    /// Load the stored credential.
    ///
    /// # Returns
    /// - `Ok(Some(credential))` if a credential is stored
    /// - `Ok(None)` if nothing is stored
    /// - `Err(error)` if loading failed
    async fn load(&self) -> Result<Option<Credential>, PersistenceError>;

    /// Save the credential, replacing any previous one.
    async fn save(&self, credential: &Credential) -> Result<(), PersistenceError>;

    /// Remove the stored credential.
    async fn clear(&self) -> Result<(), PersistenceError>;
}
