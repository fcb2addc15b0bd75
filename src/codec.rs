//! Cache entry codec
//!
//! Entries are stored as `{"data": <value>, "timestamp": <ms since epoch>}`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::CacheError;

/// Wrapper struct for cached data in storage
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached, in milliseconds since the epoch
    timestamp: u64,
}

/// A decoded entry: the value and the time it was written
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntry<T> {
    pub data: T,
    pub written_at: u64,
}

/// Wraps `value` with `written_at = now` and serializes it
pub fn encode<T: Serialize>(value: &T, now: u64) -> Result<Vec<u8>, CacheError> {
    let entry = CacheEntry {
        data: value,
        timestamp: now,
    };
    Ok(serde_json::to_vec(&entry)?)
}

/// Decodes a raw entry
///
/// Anything that is not a well-formed entry holding a `T` is reported as
/// [`CacheError::CorruptEntry`].
pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<DecodedEntry<T>, CacheError> {
    let entry: CacheEntry<T> =
        serde_json::from_slice(raw).map_err(|e| CacheError::CorruptEntry(e.to_string()))?;
    Ok(DecodedEntry {
        data: entry.data,
        written_at: entry.timestamp,
    })
}
