//! Time-bounded cache over a pluggable storage backend
//!
//! The cache decides freshness; the backend only stores bytes. An entry whose
//! age is at least the TTL reads exactly like a missing one. Storage failures
//! never reach the caller: reads turn into misses and writes are dropped,
//! with a `tracing` warning.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::clock::{Clock, SystemClock};
use crate::codec::{self, DecodedEntry};
use crate::config::{duration_millis, CacheConfig};
use crate::error::CacheError;

/// An entry read without regard to freshness, plus metadata about its age
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was written
    pub written_at: DateTime<Utc>,
    /// Time since the write (zero if the write is in the future)
    pub age: Duration,
    /// Whether the entry is past the configured TTL
    pub is_expired: bool,
}

/// Read-through cache with lazy TTL expiry
pub struct TimeBoundedCache<B: StorageBackend, C: Clock = SystemClock> {
    backend: B,
    /// `None` when the namespace could not be opened
    handle: Option<B::Handle>,
    config: CacheConfig,
    clock: C,
}

impl<B: StorageBackend> TimeBoundedCache<B> {
    /// Opens `config.namespace()` on `backend` using the system clock
    pub async fn open(backend: B, config: CacheConfig) -> Self {
        Self::open_with_clock(backend, config, SystemClock).await
    }
}

impl<B: StorageBackend, C: Clock> TimeBoundedCache<B, C> {
    /// Opens the namespace with a custom clock
    ///
    /// If the backend cannot open the namespace the cache still builds, in
    /// pass-through mode: every read misses and every write is dropped.
    pub async fn open_with_clock(backend: B, config: CacheConfig, clock: C) -> Self {
        let handle = match backend.open(config.namespace()).await {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(
                    namespace = config.namespace(),
                    error = %err,
                    "cache storage unavailable, running without cache"
                );
                None
            }
        };
        Self {
            backend,
            handle,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True when the namespace failed to open and the cache is a pass-through
    pub fn is_degraded(&self) -> bool {
        self.handle.is_none()
    }

    /// Returns the value at `key` if present and younger than the configured TTL
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_with_ttl(key, self.config.ttl()).await
    }

    /// Same as [`get`](Self::get) with a TTL for this call only
    pub async fn get_with_ttl<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let Some(entry) = self.load::<T>(key).await else {
            debug!(namespace = self.config.namespace(), key, "cache miss");
            return None;
        };
        let age = self.age_millis(entry.written_at);
        if age >= duration_millis(ttl) {
            debug!(namespace = self.config.namespace(), key, age_ms = age, "cache entry stale");
            return None;
        }
        debug!(namespace = self.config.namespace(), key, age_ms = age, "cache hit");
        Some(entry.data)
    }

    /// Reads an entry whatever its age
    pub async fn inspect<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let entry = self.load::<T>(key).await?;
        let age = self.age_millis(entry.written_at);
        let written_at = i64::try_from(entry.written_at)
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_default();
        Some(CachedData {
            data: entry.data,
            written_at,
            age: Duration::from_millis(age),
            is_expired: age >= self.config.ttl_millis(),
        })
    }

    /// Stores `value` at `key` with the current time, replacing any entry
    ///
    /// Failures are logged and the write is dropped.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_set(key, value).await {
            warn!(
                namespace = self.config.namespace(),
                key,
                error = %err,
                "dropping cache write"
            );
        }
    }

    /// Fallible form of [`set`](Self::set)
    pub async fn try_set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let handle = self.handle.as_ref().ok_or_else(|| {
            CacheError::StorageUnavailable(format!(
                "namespace '{}' is not open",
                self.config.namespace()
            ))
        })?;
        let raw = codec::encode(value, self.clock.now_millis())?;
        self.backend.write(handle, key, &raw).await
    }

    /// Removes the entry at `key`
    pub async fn invalidate(&self, key: &str) {
        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        if let Err(err) = self.backend.remove(handle, key).await {
            warn!(
                namespace = self.config.namespace(),
                key,
                error = %err,
                "failed to invalidate cache entry"
            );
        }
    }

    /// Removes every entry in this cache's namespace
    pub async fn clear(&self) {
        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        if let Err(err) = self.backend.clear(handle).await {
            warn!(
                namespace = self.config.namespace(),
                error = %err,
                "failed to clear cache namespace"
            );
        }
    }

    fn age_millis(&self, written_at: u64) -> u64 {
        self.clock.now_millis().saturating_sub(written_at)
    }

    /// Reads and decodes an entry; read errors and corrupt entries become `None`
    async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<DecodedEntry<T>> {
        let handle = self.handle.as_ref()?;
        let raw = match self.backend.read(handle, key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(
                    namespace = self.config.namespace(),
                    key,
                    error = %err,
                    "cache read failed"
                );
                return None;
            }
        };
        match codec::decode::<T>(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(
                    namespace = self.config.namespace(),
                    key,
                    error = %err,
                    "discarding corrupt cache entry"
                );
                if let Err(err) = self.backend.remove(handle, key).await {
                    debug!(key, error = %err, "could not remove corrupt entry");
                }
                None
            }
        }
    }
}
