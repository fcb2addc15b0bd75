//! Storage backends for cache entries
//!
//! A backend stores opaque encoded entries by namespace and key. It knows
//! nothing about timestamps or TTLs; freshness is decided by
//! [`TimeBoundedCache`](crate::TimeBoundedCache).
//!
//! Three adapters are provided:
//! - [`MemoryBackend`]: process-local maps, no I/O
//! - [`FileBackend`]: one JSON file per entry under an XDG cache directory
//! - [`SledBackend`]: an embedded `sled` database, one tree per namespace

mod embedded;
mod file;
mod memory;

pub use embedded::SledBackend;
pub use file::FileBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;

use crate::error::CacheError;

/// Key/value persistence for encoded entries, partitioned by namespace
///
/// Writes must be atomic per key from the caller's point of view: a reader
/// sees either the previous entry or the new one, never a mix. Clones of a
/// backend share storage.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Opened namespace, passed back to every other call
    type Handle: Send + Sync;

    /// Prepares storage for `namespace`. Calling it twice is harmless.
    async fn open(&self, namespace: &str) -> Result<Self::Handle, CacheError>;

    /// Returns the raw entry, or `None` when the key was never written
    async fn read(&self, handle: &Self::Handle, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Inserts or overwrites the entry at `key`
    async fn write(&self, handle: &Self::Handle, key: &str, raw: &[u8]) -> Result<(), CacheError>;

    /// Deletes the entry at `key`; a missing key is not an error
    async fn remove(&self, handle: &Self::Handle, key: &str) -> Result<(), CacheError>;

    /// Deletes every entry in the namespace
    async fn clear(&self, handle: &Self::Handle) -> Result<(), CacheError>;
}
