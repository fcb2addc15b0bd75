use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::StorageBackend;
use crate::error::CacheError;

type Store = Arc<DashMap<String, Vec<u8>>>;

/// In-memory backend
///
/// Entries live for as long as some clone of the backend does.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    namespaces: Arc<DashMap<String, Store>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries stored in `namespace`, expired or not
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .get(namespace)
            .map(|store| store.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    type Handle = Store;

    async fn open(&self, namespace: &str) -> Result<Self::Handle, CacheError> {
        let store = self
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .clone();
        Ok(store)
    }

    async fn read(&self, handle: &Self::Handle, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(handle.get(key).map(|raw| raw.value().clone()))
    }

    async fn write(&self, handle: &Self::Handle, key: &str, raw: &[u8]) -> Result<(), CacheError> {
        handle.insert(key.to_string(), raw.to_vec());
        Ok(())
    }

    async fn remove(&self, handle: &Self::Handle, key: &str) -> Result<(), CacheError> {
        handle.remove(key);
        Ok(())
    }

    async fn clear(&self, handle: &Self::Handle) -> Result<(), CacheError> {
        handle.clear();
        Ok(())
    }
}
