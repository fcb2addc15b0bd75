//! aquacache: a time-bounded read-through cache
//!
//! Values are stored with the time they were written and read back only while
//! younger than the namespace TTL. Expired and missing entries look the same
//! to callers. Storage is pluggable through [`StorageBackend`]; caching is an
//! optimization, so storage failures degrade to cache misses instead of errors.

pub mod backend;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod fetch;
mod populate;

pub use backend::{FileBackend, MemoryBackend, SledBackend, StorageBackend};
pub use cache::{CachedData, TimeBoundedCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::CacheError;
pub use fetch::{FetchError, HttpFetcher};
