//! File-per-entry backend
//!
//! Stores each entry as a JSON file in an XDG-compliant cache directory
//! (`~/.cache/aquacache/<namespace>/<key>.json` on Linux).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use super::StorageBackend;
use crate::config::default_cache_dir;
use crate::error::CacheError;

/// Distinguishes temp files written concurrently by one process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stores entries as files on disk
#[derive(Debug, Clone)]
pub struct FileBackend {
    /// Directory that holds one subdirectory per namespace
    root: PathBuf,
}

impl FileBackend {
    /// Creates a FileBackend using the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        default_cache_dir().map(Self::with_dir)
    }

    /// Creates a FileBackend rooted at a custom directory
    pub fn with_dir(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path to the file for `key` in the namespace directory `dir`
    fn entry_path(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", escape_file_name(key)))
    }
}

/// Escapes a key or namespace so it is a single safe path component
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes
/// `%XX`. Distinct inputs map to distinct names.
fn escape_file_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("%{:02X}", byte));
        }
    }
    escaped
}

#[async_trait]
impl StorageBackend for FileBackend {
    type Handle = PathBuf;

    async fn open(&self, namespace: &str) -> Result<Self::Handle, CacheError> {
        let dir = self.root.join(escape_file_name(namespace));
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    async fn read(
        &self,
        handle: &Self::Handle,
        key: &str,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(Self::entry_path(handle, key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, handle: &Self::Handle, key: &str, raw: &[u8]) -> Result<(), CacheError> {
        let target = Self::entry_path(handle, key);
        // Write beside the target then rename, so readers never see half a file
        let temp = handle.join(format!(
            ".{}.{}.{}.tmp",
            escape_file_name(key),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let written = match fs::write(&temp, raw).await {
            Ok(()) => fs::rename(&temp, &target).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn remove(&self, handle: &Self::Handle, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(Self::entry_path(handle, key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn clear(&self, handle: &Self::Handle) -> Result<(), CacheError> {
        let mut entries = match fs::read_dir(handle).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // Leftover temp files from interrupted writes go too
            if path.extension().is_some_and(|ext| ext == "json" || ext == "tmp") {
                match fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok(())
    }
}
