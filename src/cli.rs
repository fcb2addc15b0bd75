//! Command-line interface parsing for aquacache
//!
//! Global options pick the backend, cache directory, namespace and TTL; each
//! may also come from an `AQUACACHE_*` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use thiserror::Error;

use crate::config::{default_cache_dir, CacheConfig};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// No cache directory given and no home directory to derive one from
    #[error("Could not determine a cache directory; pass --cache-dir or set AQUACACHE_DIR")]
    NoCacheDir,

    /// The value given to `set` is not JSON
    #[error("Invalid JSON value: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Where entries are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// One JSON file per entry
    File,
    /// Embedded sled database
    Sled,
}

/// aquacache - inspect and fill the storefront response cache
#[derive(Parser, Debug)]
#[command(name = "aquacache")]
#[command(about = "Time-bounded read-through cache for storefront API responses")]
#[command(version)]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, env = "AQUACACHE_BACKEND", default_value_t = BackendKind::File)]
    pub backend: BackendKind,

    /// Cache directory (defaults to the XDG cache directory)
    #[arg(long, value_name = "DIR", env = "AQUACACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Namespace to operate on, e.g. portfolios, home-essential, category-detail
    #[arg(long, short, env = "AQUACACHE_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Override the namespace TTL, in seconds
    #[arg(long, value_name = "SECS", env = "AQUACACHE_TTL_SECS")]
    pub ttl_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the fresh value at KEY, or null
    Get { key: String },
    /// Store a JSON value at KEY
    Set { key: String, value: String },
    /// Print the entry at KEY with its age, even if expired
    Inspect { key: String },
    /// Remove the entry at KEY
    Invalidate { key: String },
    /// Remove every entry in the namespace
    Clear,
    /// Print the value at KEY, fetching URL on a miss
    Fetch { key: String, url: String },
}

/// A command with its arguments validated
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Get(String),
    Set(String, Value),
    Inspect(String),
    Invalidate(String),
    Clear,
    Fetch { key: String, url: String },
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub backend: BackendKind,
    pub cache_dir: PathBuf,
    pub cache: CacheConfig,
    pub action: Action,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the resolved directory, namespace config and action
    /// * `Err(CliError)` if no cache directory can be found or `set` was given bad JSON
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let cache_dir = match &cli.cache_dir {
            Some(dir) => dir.clone(),
            None => default_cache_dir().ok_or(CliError::NoCacheDir)?,
        };

        let mut cache = CacheConfig::for_namespace(&cli.namespace);
        if let Some(secs) = cli.ttl_secs {
            cache = cache.with_ttl(Duration::from_secs(secs));
        }

        let action = match &cli.command {
            Command::Get { key } => Action::Get(key.clone()),
            Command::Set { key, value } => Action::Set(key.clone(), serde_json::from_str(value)?),
            Command::Inspect { key } => Action::Inspect(key.clone()),
            Command::Invalidate { key } => Action::Invalidate(key.clone()),
            Command::Clear => Action::Clear,
            Command::Fetch { key, url } => Action::Fetch {
                key: key.clone(),
                url: url.clone(),
            },
        };

        Ok(StartupConfig {
            backend: cli.backend,
            cache_dir,
            cache,
            action,
        })
    }
}
