//! Per-namespace cache configuration

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

/// Namespace for portfolio (project) payloads
pub const PORTFOLIOS_NAMESPACE: &str = "portfolios";
/// Namespace for the aggregated home page payload
pub const HOME_ESSENTIAL_NAMESPACE: &str = "home-essential";
/// Namespace for category detail pages
pub const CATEGORY_DETAIL_NAMESPACE: &str = "category-detail";

/// TTL for portfolios (15 minutes)
pub const PORTFOLIOS_TTL: Duration = Duration::from_secs(15 * 60);
/// TTL for the home page payload (30 minutes)
pub const HOME_ESSENTIAL_TTL: Duration = Duration::from_secs(30 * 60);
/// TTL for category detail pages (15 minutes)
pub const CATEGORY_DETAIL_TTL: Duration = Duration::from_secs(15 * 60);
/// TTL for namespaces without a preset
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Namespace and TTL for one cache instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    namespace: String,
    ttl: Duration,
}

impl CacheConfig {
    pub fn new(namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            namespace: namespace.into(),
            ttl,
        }
    }

    pub fn portfolios() -> Self {
        Self::new(PORTFOLIOS_NAMESPACE, PORTFOLIOS_TTL)
    }

    pub fn home_essential() -> Self {
        Self::new(HOME_ESSENTIAL_NAMESPACE, HOME_ESSENTIAL_TTL)
    }

    pub fn category_detail() -> Self {
        Self::new(CATEGORY_DETAIL_NAMESPACE, CATEGORY_DETAIL_TTL)
    }

    /// The preset for a known namespace, or [`DEFAULT_TTL`] for any other name
    pub fn for_namespace(namespace: &str) -> Self {
        match namespace {
            PORTFOLIOS_NAMESPACE => Self::portfolios(),
            HOME_ESSENTIAL_NAMESPACE => Self::home_essential(),
            CATEGORY_DETAIL_NAMESPACE => Self::category_detail(),
            other => Self::new(other, DEFAULT_TTL),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn ttl_millis(&self) -> u64 {
        duration_millis(self.ttl)
    }
}

/// XDG cache directory for the crate (`~/.cache/aquacache` on Linux)
///
/// Returns `None` if it cannot be determined (e.g., no home directory).
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "aquacache").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
