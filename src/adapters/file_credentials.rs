//! File-based credential persistence adapter.
//!
//! Stores the credential as JSON under `~/.bookline/.credentials.json`,
//! keeping the session durable across process restarts.

use async_trait::async_trait;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::auth::credentials::Credential;
use crate::traits::{CredentialsPersistence, PersistenceError};

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".bookline";

/// The credentials file name.
const CREDENTIALS_FILE: &str = ".credentials.json";

/// File-based credential persistence.
///
/// # Example
///
/// ```ignore
/// use bookline_client::adapters::FileCredentialsStore;
/// use bookline_client::auth::CredentialStore;
/// use std::sync::Arc;
///
/// let backend = Arc::new(FileCredentialsStore::new()?);
/// let store = CredentialStore::with_persistence(backend);
/// store.hydrate().await?;
/// ```
#[derive(Debug)]
pub struct FileCredentialsStore {
    credentials_path: PathBuf,
}

impl FileCredentialsStore {
    /// Create a store rooted in the user's home directory.
    pub fn new() -> Result<Self, PersistenceError> {
        let home = dirs::home_dir().ok_or_else(|| {
            PersistenceError::Other("Failed to determine home directory".to_string())
        })?;
        Ok(Self {
            credentials_path: home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE),
        })
    }

    /// Create a store at an explicit file path.
    pub fn with_path(credentials_path: PathBuf) -> Self {
        Self { credentials_path }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &PathBuf {
        &self.credentials_path
    }
}

#[async_trait]
impl CredentialsPersistence for FileCredentialsStore {
    async fn load(&self) -> Result<Option<Credential>, PersistenceError> {
        if !self.credentials_path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.credentials_path)
            .map_err(|e| PersistenceError::LoadFailed(e.to_string()))?;
        let reader = BufReader::new(file);
        let credential = serde_json::from_reader(reader)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        Ok(Some(credential))
    }

    async fn save(&self, credential: &Credential) -> Result<(), PersistenceError> {
        if let Some(parent) = self.credentials_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| PersistenceError::Io(e.to_string()))?;
            }
        }

        let file = File::create(&self.credentials_path)
            .map_err(|e| PersistenceError::SaveFailed(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, credential)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| PersistenceError::SaveFailed(e.to_string()))
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        if !self.credentials_path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.credentials_path)
            .map_err(|e| PersistenceError::ClearFailed(e.to_string()))
    }
}
