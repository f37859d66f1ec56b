//! In-memory credential persistence for testing.
//!
//! Stores the credential in memory and can be told to fail any
//! operation, so tests can exercise the store's failed-write paths
//! without touching the file system.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::auth::credentials::Credential;
use crate::traits::{CredentialsPersistence, PersistenceError};

/// In-memory credential persistence for testing.
///
/// # Example
///
/// ```ignore
/// use bookline_client::adapters::mock::InMemoryPersistence;
/// use bookline_client::traits::CredentialsPersistence;
///
/// let backend = InMemoryPersistence::new();
/// assert!(backend.load().await?.is_none());
///
/// backend.set_save_should_fail(true);
/// assert!(backend.save(&credential).await.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryPersistence {
    credential: Arc<Mutex<Option<Credential>>>,
    save_should_fail: Arc<Mutex<bool>>,
    load_should_fail: Arc<Mutex<bool>>,
    clear_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryPersistence {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            credential: Arc::new(Mutex::new(None)),
            save_should_fail: Arc::new(Mutex::new(false)),
            load_should_fail: Arc::new(Mutex::new(false)),
            clear_should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Create a backend with an initial credential.
    pub fn with_credential(credential: Credential) -> Self {
        let backend = Self::new();
        *backend.credential.lock().unwrap() = Some(credential);
        backend
    }

    /// Configure whether save should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether load should fail.
    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether clear should fail.
    pub fn set_clear_should_fail(&self, should_fail: bool) {
        *self.clear_should_fail.lock().unwrap() = should_fail;
    }

    /// The currently stored credential, for assertions.
    pub fn stored(&self) -> Option<Credential> {
        self.credential.lock().unwrap().clone()
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsPersistence for InMemoryPersistence {
    async fn load(&self) -> Result<Option<Credential>, PersistenceError> {
        if *self.load_should_fail.lock().unwrap() {
            return Err(PersistenceError::LoadFailed("simulated failure".to_string()));
        }
        Ok(self.credential.lock().unwrap().clone())
    }

    async fn save(&self, credential: &Credential) -> Result<(), PersistenceError> {
        if *self.save_should_fail.lock().unwrap() {
            return Err(PersistenceError::SaveFailed("simulated failure".to_string()));
        }
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        if *self.clear_should_fail.lock().unwrap() {
            return Err(PersistenceError::ClearFailed(
                "simulated failure".to_string(),
            ));
        }
        *self.credential.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("access", "refresh", serde_json::Value::Null)
    }

    #[tokio::test]
    async fn test_save_load_clear_roundtrip() {
        let backend = InMemoryPersistence::new();
        assert!(backend.load().await.unwrap().is_none());

        backend.save(&credential()).await.unwrap();
        assert_eq!(backend.load().await.unwrap().unwrap(), credential());

        backend.clear().await.unwrap();
        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_with_credential() {
        let backend = InMemoryPersistence::with_credential(credential());
        assert!(backend.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let backend = InMemoryPersistence::with_credential(credential());

        backend.set_save_should_fail(true);
        assert!(backend.save(&credential()).await.is_err());

        backend.set_load_should_fail(true);
        assert!(backend.load().await.is_err());

        backend.set_clear_should_fail(true);
        assert!(backend.clear().await.is_err());
        // The credential survives a failed clear.
        assert!(backend.stored().is_some());
    }
}
