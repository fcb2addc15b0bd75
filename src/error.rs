//! Error types shared by the cache, its codec and its storage backends

use thiserror::Error;

/// Errors raised inside the caching layer
///
/// None of these reach callers of [`TimeBoundedCache::get`](crate::TimeBoundedCache::get)
/// or [`TimeBoundedCache::set`](crate::TimeBoundedCache::set): the cache logs them and
/// degrades to a miss or a dropped write. They are returned by backends, the codec and
/// [`TimeBoundedCache::try_set`](crate::TimeBoundedCache::try_set).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be opened, read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored entry could not be decoded
    #[error("Corrupt cache entry: {0}")]
    CorruptEntry(String),

    /// A value could not be serialized for storage
    #[error("Failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::StorageUnavailable(err.to_string())
    }
}

impl From<sled::Error> for CacheError {
    fn from(err: sled::Error) -> Self {
        CacheError::StorageUnavailable(err.to_string())
    }
}
