//! Credential storage traits and backends.
//!
//! The credential is an opaque token owned exclusively by the store; no other
//! component persists it. The fetch path only ever reads the store, and treats
//! any read failure as "no credential".

use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Fixed key the credential is stored under in durable storage.
pub const CREDENTIAL_KEY: &str = "notification_preferences_token";

/// Opaque authentication token proving caller identity to the remote service.
///
/// Never inspected client-side; validity is the server's call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(SmolStr);

impl Credential {
    /// Wrap a raw token.
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(SmolStr::new(token))
    }

    /// The raw token, for building an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Errors emitted by credential stores on write.
///
/// Readers never see these: `get` maps any backend failure to `None`.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum StoreError {
    /// Filesystem or I/O error
    #[error("I/O error: {0}")]
    #[diagnostic(code(carillon::store::io))]
    Io(#[from] std::io::Error),
    /// Serialization error (e.g., JSON)
    #[error("serialization error: {0}")]
    #[diagnostic(code(carillon::store::serde))]
    Serde(#[from] serde_json::Error),
    /// Any other error from a backend implementation
    #[error(transparent)]
    #[diagnostic(code(carillon::store::other))]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

/// Pluggable durable storage for the authentication credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Get the stored credential if present. Backend failures read as absent.
    async fn get(&self) -> Option<Credential>;
    /// Persist the given credential.
    async fn set(&self, credential: Credential) -> Result<(), StoreError>;
    /// Erase the stored credential.
    async fn clear(&self) -> Result<(), StoreError>;
    /// Presence check only; no expiry or format validation happens here.
    async fn has_credential(&self) -> bool {
        self.get().await.is_some()
    }
}

/// In-memory credential store suitable for short-lived sessions and tests.
#[derive(Default)]
pub struct MemoryCredentialStore(RwLock<Option<Credential>>);

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Option<Credential> {
        self.0.read().await.clone()
    }
    async fn set(&self, credential: Credential) -> Result<(), StoreError> {
        *self.0.write().await = Some(credential);
        Ok(())
    }
    async fn clear(&self) -> Result<(), StoreError> {
        *self.0.write().await = None;
        Ok(())
    }
}

/// File-backed credential store using a JSON file.
///
/// NOT secure, only suitable for development. The token lives under
/// [`CREDENTIAL_KEY`] in a JSON object so the file stays inspectable.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a new file credential store at the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Option<Credential> {
        let data = tokio::fs::read(&self.path).await.ok()?;
        let store: Value = serde_json::from_slice(&data).ok()?;
        let token = store.get(CREDENTIAL_KEY)?.as_str()?;
        Some(Credential::new(token))
    }

    async fn set(&self, credential: Credential) -> Result<(), StoreError> {
        let store = serde_json::json!({ CREDENTIAL_KEY: credential.as_str() });
        let buf = serde_json::to_vec_pretty(&store)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &buf).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from(e)),
        }
    }
}
