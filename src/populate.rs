//! Fetch-or-populate: serve from cache, otherwise call a producer and store
//! what it returns.

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::backend::StorageBackend;
use crate::cache::TimeBoundedCache;
use crate::clock::Clock;

impl<B: StorageBackend, C: Clock> TimeBoundedCache<B, C> {
    /// Returns the fresh cached value at `key`, or runs `producer` and caches its result
    ///
    /// The producer runs at most once per call and not at all on a hit. A producer
    /// error comes back unchanged; nothing is written, and any stale entry is left
    /// alone so the next call fetches again. Concurrent callers that both miss
    /// will both run their producers.
    pub async fn get_or_populate<T, E, F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_populate_with_ttl(key, self.config().ttl(), producer)
            .await
    }

    /// Same as [`get_or_populate`](Self::get_or_populate) with a TTL for this call only
    pub async fn get_or_populate_with_ttl<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get_with_ttl::<T>(key, ttl).await {
            return Ok(cached);
        }

        debug!(namespace = self.config().namespace(), key, "populating cache");
        let value = producer().await?;
        self.set(key, &value).await;
        Ok(value)
    }
}
