//! Credential lifecycle: storage, single-flight refresh, and session
//! termination.

pub mod credentials;
pub mod refresh;
pub mod session;

pub use credentials::{
    Credential, CredentialEvent, CredentialStore, StoreError, SubscriberId, UserProfile,
};
pub use refresh::{
    RefreshCoordinator, RefreshFailure, RefreshOutcome, DEFAULT_REFRESH_DEADLINE,
    REFRESH_ENDPOINT,
};
pub use session::SessionTerminator;
