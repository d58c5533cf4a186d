//! Filesystem cache provider
//!
//! One file per key under a root directory. File names are the SHA-256 of
//! the key, so arbitrary keys (paths included) map to safe names. Only files
//! carrying this provider's extension are counted or cleared; the root may be
//! a cache directory shared with other software.
//!
//! Unreadable or expired files are removed when met and count as misses, so
//! a damaged cache never blocks a caller.

use crate::constants::FILESYSTEM_CACHE_EXTENSION;
use async_trait::async_trait;
use diplug_domain::error::{Error, Result};
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    expires_at: Option<u64>,
    value: String,
}

impl StoredEntry {
    fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Filesystem-backed cache rooted at a fixed directory
#[derive(Clone)]
pub struct FilesystemCacheProvider {
    root: PathBuf,
    stats: Arc<RwLock<CacheStats>>,
}

impl FilesystemCacheProvider {
    /// Create a provider rooted at `root`
    ///
    /// The directory is created lazily on the first write.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            stats: Arc::new(RwLock::new(CacheStats::new())),
        }
    }

    /// Root directory of this cache
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root
            .join(format!("{}.{}", hex::encode(digest), FILESYSTEM_CACHE_EXTENSION))
    }

    async fn read_entry(&self, key: &str) -> Result<Option<StoredEntry>> {
        let path = self.entry_path(key);
        match self.read_file(&path).await? {
            Some(entry) if entry.key == key => Ok(Some(entry)),
            Some(_) => {
                self.remove_file(&path).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Live entry stored at `path`
    ///
    /// Expired and unreadable entries are removed and read as missing.
    async fn read_file(&self, path: &Path) -> Result<Option<StoredEntry>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(path = %path.display(), "Discarding cache file that is not UTF-8");
                self.remove_file(path).await?;
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::cache_with_source(
                    format!("Failed to read cache file {}", path.display()),
                    e,
                ));
            }
        };

        let entry = match serde_json::from_str::<StoredEntry>(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding corrupt cache file");
                self.remove_file(path).await?;
                return Ok(None);
            }
        };

        if entry.is_expired(unix_now()) {
            self.remove_file(path).await?;
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn remove_file(&self, path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::cache_with_source(
                format!("Failed to remove cache file {}", path.display()),
                e,
            )),
        }
    }

    async fn entry_files(&self) -> Result<Vec<PathBuf>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::cache_with_source("Failed to list cache directory", e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| Error::cache_with_source("Failed to list cache directory", e))?
        {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == FILESYSTEM_CACHE_EXTENSION)
            {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn record(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.write() {
            if hit {
                stats.record_hit();
            } else {
                stats.record_miss();
            }
        }
    }
}

#[async_trait]
impl CacheProvider for FilesystemCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let entry = self.read_entry(key).await?;
        self.record(entry.is_some());
        Ok(entry.map(|e| e.value))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            Error::cache_with_source(
                format!("Failed to create cache directory {}", self.root.display()),
                e,
            )
        })?;

        let entry = StoredEntry {
            key: key.to_string(),
            expires_at: config.ttl_secs().map(|ttl| unix_now().saturating_add(ttl)),
            value: value.to_string(),
        };
        let content = serde_json::to_vec(&entry)?;

        // Each writer stages its own file; readers only ever see complete entries
        let path = self.entry_path(key);
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&tmp, content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::cache_with_source("Failed to write cache file", e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::cache_with_source(
                "Failed to move cache file into place",
                e,
            ));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);
        self.remove_file(&path).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.read_entry(key).await?.is_some())
    }

    async fn clear(&self) -> Result<()> {
        for path in self.entry_files().await? {
            self.remove_file(&path).await?;
        }
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let mut stats = self.stats.read().map(|s| s.clone()).unwrap_or_default();
        stats.entries = self.entry_files().await?.len() as u64;
        Ok(stats)
    }

    async fn size(&self) -> Result<usize> {
        Ok(self.entry_files().await?.len())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        let mut removed = 0;
        for path in self.entry_files().await? {
            if let Some(entry) = self.read_file(&path).await? {
                if entry.key.starts_with(prefix) && self.remove_file(&path).await? {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn size_prefix(&self, prefix: &str) -> Result<usize> {
        let mut count = 0;
        for path in self.entry_files().await? {
            if self
                .read_file(&path)
                .await?
                .is_some_and(|entry| entry.key.starts_with(prefix))
            {
                count += 1;
            }
        }
        Ok(count)
    }

    fn provider_name(&self) -> &str {
        "filesystem"
    }
}

impl std::fmt::Debug for FilesystemCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemCacheProvider")
            .field("root", &self.root)
            .finish()
    }
}
