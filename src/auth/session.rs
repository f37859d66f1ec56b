//! Session termination.
//!
//! When a request fails with an unrecoverable authentication error, the
//! session ends: the credential store is cleared and logout observers
//! are told to send the user back to a login surface. Many concurrent
//! requests can hit that error at once; the teardown must still happen
//! exactly once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::credentials::{CredentialStore, SubscriberId};

type LogoutObserver = Box<dyn Fn() + Send + Sync>;

/// Idempotent session teardown.
///
/// `terminate` clears the [`CredentialStore`] and emits one logout
/// notification. Concurrent calls race on the store's clear transition;
/// only the caller that actually cleared it notifies, so observers see
/// exactly one logout per session regardless of how many requests
/// escalate simultaneously.
pub struct SessionTerminator {
    store: Arc<CredentialStore>,
    observers: Mutex<Vec<(SubscriberId, LogoutObserver)>>,
    next_id: AtomicU64,
}

impl SessionTerminator {
    /// Create a terminator for the given store.
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self {
            store,
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a logout observer.
    ///
    /// Collaborators typically redirect to a login surface from here.
    pub fn on_logout(&self, observer: impl Fn() + Send + Sync + 'static) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers
            .lock()
            .unwrap()
            .push((id, Box::new(observer)));
        id
    }

    /// Remove a previously registered logout observer.
    pub fn remove_logout_observer(&self, id: SubscriberId) -> bool {
        let mut observers = self.observers.lock().unwrap();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Clear the store and notify logout observers exactly once.
    ///
    /// A second or concurrent call observes the already-cleared store
    /// and does nothing.
    pub async fn terminate(&self) {
        match self.store.clear().await {
            Ok(true) => {
                tracing::info!("session terminated, credentials cleared");
                let observers = self.observers.lock().unwrap();
                for (_, observer) in observers.iter() {
                    observer();
                }
            }
            Ok(false) => {
                tracing::debug!("session already terminated");
            }
            Err(err) => {
                tracing::warn!("session terminate could not clear credentials: {}", err);
            }
        }
    }
}

impl std::fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("observers", &self.observers.lock().unwrap().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::Credential;
    use std::sync::atomic::AtomicUsize;

    async fn active_session() -> (Arc<CredentialStore>, SessionTerminator) {
        let store = Arc::new(CredentialStore::new());
        store
            .set(Credential::new("access", "refresh", serde_json::Value::Null))
            .await
            .unwrap();
        let terminator = SessionTerminator::new(Arc::clone(&store));
        (store, terminator)
    }

    #[tokio::test]
    async fn test_terminate_clears_store_and_notifies() {
        let (store, terminator) = active_session().await;
        let count = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&count);
        terminator.on_logout(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        terminator.terminate().await;

        assert!(store.get().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_terminate_notifies_once() {
        let (_store, terminator) = active_session().await;
        let count = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&count);
        terminator.on_logout(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        terminator.terminate().await;
        terminator.terminate().await;
        terminator.terminate().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_terminates_notify_once() {
        let (store, terminator) = active_session().await;
        let terminator = Arc::new(terminator);
        let count = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&count);
        terminator.on_logout(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let mut handles = Vec::new();
        for _ in 0..8 {
            let terminator = Arc::clone(&terminator);
            handles.push(tokio::spawn(async move {
                terminator.terminate().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(store.get().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_terminate_after_collaborator_logout_is_silent() {
        let (store, terminator) = active_session().await;
        let count = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&count);
        terminator.on_logout(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        // Collaborator-owned logout goes through the store directly.
        store.clear().await.unwrap();
        terminator.terminate().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_removed_observer_is_not_notified() {
        let (_store, terminator) = active_session().await;
        let count = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&count);
        let id = terminator.on_logout(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(terminator.remove_logout_observer(id));
        assert!(!terminator.remove_logout_observer(id));
        terminator.terminate().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
