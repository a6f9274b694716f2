//! Client-local storage
//!
//! The only durable state is a single "user session active" flag that
//! gates the protected views. Backed by memory or by a small JSON file.

use crate::error::AdvisorError;
use crate::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Storage key holding the signed-in user
pub const AUTH_USER_KEY: &str = "authUser";

/// Trait for key-value persistence
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store, lost when the process exits
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a JSON object on disk
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(AdvisorError::StorageError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, bytes).await.map_err(|e| {
            AdvisorError::StorageError(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.read().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

/// Pick the backend from an optional file path
pub fn build_store(path: Option<PathBuf>) -> Arc<dyn KeyValueStore> {
    match path {
        Some(path) => {
            info!("Session flag store: file {}", path.display());
            Arc::new(FileStore::new(path))
        }
        None => {
            info!("Session flag store: in-memory");
            Arc::new(InMemoryStore::new())
        }
    }
}

/// Gate for the protected views
#[derive(Clone)]
pub struct AccessGate {
    store: Arc<dyn KeyValueStore>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Unreadable storage counts as signed out
    pub async fn is_authenticated(&self) -> bool {
        match self.store.get(AUTH_USER_KEY).await {
            Ok(user) => user.is_some(),
            Err(error) => {
                warn!("Session flag unreadable, treating as signed out: {}", error);
                false
            }
        }
    }

    pub async fn current_user(&self) -> Result<Option<String>> {
        self.store.get(AUTH_USER_KEY).await
    }

    pub async fn login(&self, user: &str) -> Result<()> {
        let user = user.trim();
        if user.is_empty() {
            return Err(AdvisorError::EmptyUserName);
        }
        self.store.set(AUTH_USER_KEY, user).await?;
        info!("User signed in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.remove(AUTH_USER_KEY).await?;
        info!("User signed out");
        Ok(())
    }
}
