//! aquacache - inspect and fill the storefront response cache from the shell
//!
//! Values are printed to stdout as JSON; logs go to stderr (`RUST_LOG` controls
//! the level, default `warn`).

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use aquacache::cli::{Action, BackendKind, Cli, StartupConfig};
use aquacache::{FileBackend, HttpFetcher, SledBackend, StorageBackend, TimeBoundedCache};

/// File name of the sled database inside the cache directory
const SLED_DB_NAME: &str = "aquacache.sled";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs the requested action against one backend
async fn run<B: StorageBackend>(backend: B, startup: &StartupConfig) -> Result<(), Box<dyn Error>> {
    let cache = TimeBoundedCache::open(backend, startup.cache.clone()).await;

    match &startup.action {
        Action::Get(key) => print_json(&cache.get::<Value>(key).await)?,
        Action::Set(key, value) => cache.try_set(key, value).await?,
        Action::Inspect(key) => {
            let entry = cache.inspect::<Value>(key).await.map(|entry| {
                json!({
                    "data": entry.data,
                    "written_at": entry.written_at.to_rfc3339(),
                    "age_ms": u64::try_from(entry.age.as_millis()).unwrap_or(u64::MAX),
                    "ttl_ms": cache.config().ttl_millis(),
                    "is_expired": entry.is_expired,
                })
            });
            print_json(&entry)?
        }
        Action::Invalidate(key) => cache.invalidate(key).await,
        Action::Clear => cache.clear().await,
        Action::Fetch { key, url } => {
            let fetcher = HttpFetcher::new();
            let value = cache
                .get_or_populate(key, || fetcher.fetch_json(url))
                .await?;
            print_json(&value)?
        }
    }

    Ok(())
}

async fn try_main(cli: Cli) -> Result<(), Box<dyn Error>> {
    let startup = StartupConfig::from_cli(&cli)?;

    match startup.backend {
        BackendKind::File => {
            let backend = FileBackend::with_dir(startup.cache_dir.clone());
            run(backend, &startup).await
        }
        BackendKind::Sled => {
            let backend =
                SledBackend::open_path_or_unavailable(startup.cache_dir.join(SLED_DB_NAME));
            run(backend, &startup).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before parsing so AQUACACHE_* fallbacks see it
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match try_main(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
