//! Credential model and shared credential store.
//!
//! The [`CredentialStore`] is the single shared mutable resource of the
//! client: one mutex-guarded slot holding the current [`Credential`],
//! replaced as a whole value so concurrent readers never observe a
//! partially written credential. Mutations notify an explicit observer
//! list synchronously, after the optional persistence backend has
//! accepted the write.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::traits::{CredentialsPersistence, PersistenceError};

/// Opaque user payload returned by the backend, passed through unchanged.
pub type UserProfile = serde_json::Value;

/// Authentication credential for the Bookline platform.
///
/// Owned exclusively by the [`CredentialStore`]; replaced atomically,
/// never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    /// Short-lived bearer token attached to authenticated requests.
    pub access_token: String,
    /// Longer-lived token exchanged for new access tokens.
    pub refresh_token: String,
    /// The authenticated user's profile.
    #[serde(default)]
    pub user: UserProfile,
}

impl Credential {
    /// Create a new credential.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: UserProfile,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user,
        }
    }

    /// Copy of this credential with a replaced access token.
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: self.refresh_token.clone(),
            user: self.user.clone(),
        }
    }

    /// Check whether a refresh token is present.
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Store mutation events delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialEvent {
    /// The credential was replaced (login or refresh).
    Updated(Credential),
    /// The credential was removed (logout or session termination).
    Cleared,
}

/// Handle returned by [`CredentialStore::subscribe`], used to unsubscribe.
pub type SubscriberId = u64;

type Observer = Box<dyn Fn(&CredentialEvent) + Send + Sync>;

/// Credential store mutation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence backend rejected the write; in-memory state is
    /// unchanged.
    #[error("credential storage backend failed: {0}")]
    Backend(#[from] PersistenceError),
}

/// Shared store for the current credential.
///
/// Constructed once per client session and passed to every component
/// that needs it; there is no process-wide singleton.
///
/// # Example
///
/// ```ignore
/// use bookline_client::auth::{Credential, CredentialStore};
///
/// let store = CredentialStore::new();
/// let id = store.subscribe(|event| println!("credential event: {:?}", event));
/// store.set(Credential::new("access", "refresh", serde_json::json!({"id": 1}))).await?;
/// store.unsubscribe(id);
/// ```
pub struct CredentialStore {
    slot: Mutex<Option<Credential>>,
    observers: Mutex<Vec<(SubscriberId, Observer)>>,
    next_id: AtomicU64,
    persistence: Option<Arc<dyn CredentialsPersistence>>,
}

impl CredentialStore {
    /// Create an in-memory store with no persistence backend.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            persistence: None,
        }
    }

    /// Create a store that writes through the given persistence backend.
    pub fn with_persistence(backend: Arc<dyn CredentialsPersistence>) -> Self {
        Self {
            slot: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            persistence: Some(backend),
        }
    }

    /// Hydrate the store from its persistence backend.
    ///
    /// Returns the loaded credential, if any. Subscribers are notified
    /// when a credential was found.
    pub async fn hydrate(&self) -> Result<Option<Credential>, StoreError> {
        let Some(backend) = &self.persistence else {
            return Ok(None);
        };
        let loaded = backend.load().await?;
        if let Some(credential) = &loaded {
            *self.slot.lock().unwrap() = Some(credential.clone());
            self.notify(&CredentialEvent::Updated(credential.clone()));
        }
        Ok(loaded)
    }

    /// Get the current credential, if any.
    pub fn get(&self) -> Option<Credential> {
        self.slot.lock().unwrap().clone()
    }

    /// Check whether a credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    /// Replace the current credential.
    ///
    /// The persistence backend (when configured) is written first; a
    /// backend failure is returned to the caller and leaves both the
    /// durable and in-memory state intact. Subscribers are notified
    /// synchronously after the mutation is durable.
    pub async fn set(&self, credential: Credential) -> Result<(), StoreError> {
        if let Some(backend) = &self.persistence {
            backend.save(&credential).await?;
        }
        *self.slot.lock().unwrap() = Some(credential.clone());
        tracing::debug!("credential store updated");
        self.notify(&CredentialEvent::Updated(credential));
        Ok(())
    }

    /// Remove the current credential.
    ///
    /// Returns `Ok(true)` when a credential was present and is now
    /// cleared (subscribers notified), `Ok(false)` when the store was
    /// already empty. A backend failure leaves state intact.
    pub async fn clear(&self) -> Result<bool, StoreError> {
        if let Some(backend) = &self.persistence {
            backend.clear().await?;
        }
        let was_present = self.slot.lock().unwrap().take().is_some();
        if was_present {
            tracing::debug!("credential store cleared");
            self.notify(&CredentialEvent::Cleared);
        }
        Ok(was_present)
    }

    /// Register an observer for store mutations.
    ///
    /// Observers are invoked synchronously on the mutating task, after
    /// the mutation is committed.
    pub fn subscribe(
        &self,
        observer: impl Fn(&CredentialEvent) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers
            .lock()
            .unwrap()
            .push((id, Box::new(observer)));
        id
    }

    /// Remove a previously registered observer.
    ///
    /// Returns `true` if the observer was found and removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut observers = self.observers.lock().unwrap();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    // Invoked with the slot lock released; an observer may call get().
    fn notify(&self, event: &CredentialEvent) {
        let observers = self.observers.lock().unwrap();
        for (_, observer) in observers.iter() {
            observer(event);
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::InMemoryPersistence;
    use std::sync::atomic::AtomicUsize;

    fn credential(access: &str) -> Credential {
        Credential::new(access, "refresh-1", serde_json::json!({"id": "user-1"}))
    }

    #[test]
    fn test_credential_with_access_token() {
        let original = credential("old");
        let rotated = original.with_access_token("new");
        assert_eq!(rotated.access_token, "new");
        assert_eq!(rotated.refresh_token, original.refresh_token);
        assert_eq!(rotated.user, original.user);
    }

    #[test]
    fn test_credential_has_refresh_token() {
        assert!(credential("a").has_refresh_token());
        let without = Credential::new("a", "", serde_json::Value::Null);
        assert!(!without.has_refresh_token());
    }

    #[test]
    fn test_credential_serialization_roundtrip() {
        let original = credential("access-1");
        let json = serde_json::to_string(&original).unwrap();
        let restored: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_credential_deserialize_without_user() {
        let json = r#"{"access_token":"a","refresh_token":"r"}"#;
        let restored: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(restored.user, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_set_get_clear_roundtrip() {
        let store = CredentialStore::new();
        assert!(store.get().is_none());
        assert!(!store.is_authenticated());

        store.set(credential("access-1")).await.unwrap();
        assert_eq!(store.get().unwrap().access_token, "access-1");
        assert!(store.is_authenticated());

        assert!(store.clear().await.unwrap());
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn test_clear_on_empty_store_reports_absent() {
        let store = CredentialStore::new();
        assert!(!store.clear().await.unwrap());
    }

    #[tokio::test]
    async fn test_subscribers_observe_mutations() {
        let store = CredentialStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&events);
        store.subscribe(move |event| seen.lock().unwrap().push(event.clone()));

        store.set(credential("access-1")).await.unwrap();
        store.clear().await.unwrap();
        // Clearing an empty store must not notify again.
        store.clear().await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CredentialEvent::Updated(_)));
        assert_eq!(events[1], CredentialEvent::Cleared);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_notifications() {
        let store = CredentialStore::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&count);
        let id = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        store.set(credential("a")).await.unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set(credential("b")).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_observer_can_read_store() {
        let store = Arc::new(CredentialStore::new());
        let observed = Arc::new(Mutex::new(None));

        let reader = Arc::clone(&store);
        let slot = Arc::clone(&observed);
        store.subscribe(move |_| {
            *slot.lock().unwrap() = reader.get();
        });

        store.set(credential("visible")).await.unwrap();
        assert_eq!(
            observed.lock().unwrap().as_ref().unwrap().access_token,
            "visible"
        );
    }

    #[tokio::test]
    async fn test_persistence_write_through() {
        let backend = Arc::new(InMemoryPersistence::new());
        let store = CredentialStore::with_persistence(backend.clone());

        store.set(credential("durable")).await.unwrap();
        assert_eq!(backend.stored().unwrap().access_token, "durable");

        store.clear().await.unwrap();
        assert!(backend.stored().is_none());
    }

    #[tokio::test]
    async fn test_failed_backend_write_leaves_state_intact() {
        let backend = Arc::new(InMemoryPersistence::new());
        let store = CredentialStore::with_persistence(backend.clone());
        store.set(credential("original")).await.unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        backend.set_save_should_fail(true);
        let result = store.set(credential("replacement")).await;
        assert!(result.is_err());
        assert_eq!(store.get().unwrap().access_token, "original");
        assert_eq!(count.load(Ordering::SeqCst), 0);

        backend.set_clear_should_fail(true);
        assert!(store.clear().await.is_err());
        assert_eq!(store.get().unwrap().access_token, "original");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hydrate_loads_persisted_credential() {
        let backend = Arc::new(InMemoryPersistence::with_credential(credential("saved")));
        let store = CredentialStore::with_persistence(backend);

        let loaded = store.hydrate().await.unwrap();
        assert_eq!(loaded.unwrap().access_token, "saved");
        assert_eq!(store.get().unwrap().access_token, "saved");
    }

    #[tokio::test]
    async fn test_hydrate_without_backend_is_empty() {
        let store = CredentialStore::new();
        assert!(store.hydrate().await.unwrap().is_none());
    }
}
