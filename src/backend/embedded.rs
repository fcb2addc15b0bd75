use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use super::StorageBackend;
use crate::error::CacheError;

/// Sled-based backend, one tree per namespace
#[derive(Debug, Clone)]
pub struct SledBackend {
    /// The open database, or why it could not be opened
    db: Result<sled::Db, String>,
}

impl SledBackend {
    /// Opens (or creates) a database at `path`
    /// Creates the parent directory if it doesn't exist
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)?;
        Ok(Self { db: Ok(db) })
    }

    /// Like [`open_path`](Self::open_path), but a database that cannot be opened
    /// (locked by another process, unusable directory) yields a backend whose
    /// namespaces all fail to open, so caches built on it run as pass-throughs.
    pub fn open_path_or_unavailable(path: impl AsRef<Path>) -> Self {
        match Self::open_path(path.as_ref()) {
            Ok(backend) => backend,
            Err(err) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %err,
                    "sled database unavailable, running without cache"
                );
                Self {
                    db: Err(err.to_string()),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.db.is_ok()
    }

    /// A database that is deleted when the last clone is dropped
    pub fn temporary() -> Result<Self, CacheError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db: Ok(db) })
    }
}

#[async_trait]
impl StorageBackend for SledBackend {
    type Handle = sled::Tree;

    async fn open(&self, namespace: &str) -> Result<Self::Handle, CacheError> {
        let db = self
            .db
            .as_ref()
            .map_err(|reason| CacheError::StorageUnavailable(reason.clone()))?;
        Ok(db.open_tree(namespace.as_bytes())?)
    }

    async fn read(&self, handle: &Self::Handle, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(handle.get(key.as_bytes())?.map(|raw| raw.to_vec()))
    }

    async fn write(&self, handle: &Self::Handle, key: &str, raw: &[u8]) -> Result<(), CacheError> {
        handle.insert(key.as_bytes(), raw)?;
        handle.flush_async().await?;
        Ok(())
    }

    async fn remove(&self, handle: &Self::Handle, key: &str) -> Result<(), CacheError> {
        handle.remove(key.as_bytes())?;
        handle.flush_async().await?;
        Ok(())
    }

    async fn clear(&self, handle: &Self::Handle) -> Result<(), CacheError> {
        handle.clear()?;
        handle.flush_async().await?;
        Ok(())
    }
}
