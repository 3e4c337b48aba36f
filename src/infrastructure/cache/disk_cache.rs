//! Disk-based response cache.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::entities::{CacheEntry, CacheKey, EntryMetadata};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::CacheStorePort;

/// Default disk tier capacity (40 MiB).
pub const DEFAULT_DISK_CAPACITY: u64 = 40 * 1024 * 1024;

const BODY_EXT: &str = "img";
const META_EXT: &str = "meta";

/// Slow cache tier. Each entry is a body file plus a JSON metadata sidecar,
/// named after a hash of the key. Capacity is charged for bodies only.
pub struct DiskCacheStore {
    cache_dir: PathBuf,
    max_size: u64,
    current_size: AtomicU64,
    item_count: AtomicUsize,
}

impl DiskCacheStore {
    /// Opens (creating if needed) a cache in the specified directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created or read.
    pub async fn new(cache_dir: PathBuf, max_size: u64) -> CacheResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to create cache dir: {e}")))?;
        let mut total_size = 0u64;
        let mut count = 0usize;

        let mut entries = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to read cache dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if has_ext(&path, BODY_EXT)
                && let Ok(meta) = entry.metadata().await
            {
                total_size += meta.len();
                count += 1;
            }
        }

        let cache = Self {
            cache_dir,
            max_size,
            current_size: AtomicU64::new(total_size),
            item_count: AtomicUsize::new(count),
        };

        cache.cleanup_if_needed().await;

        Ok(cache)
    }

    /// Opens a cache in the platform cache directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created.
    pub async fn default_location(max_size: u64) -> CacheResult<Self> {
        Self::new(default_cache_dir(), max_size).await
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn body_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{BODY_EXT}", key.file_stem()))
    }

    fn meta_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{META_EXT}", key.file_stem()))
    }

    /// Reads an entry from disk.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let meta_raw = fs::read(self.meta_path(key)).await.ok()?;
        let metadata: EntryMetadata = match serde_json::from_slice(&meta_raw) {
            Ok(m) => m,
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt disk cache metadata");
                return None;
            }
        };
        if metadata.key != *key {
            trace!(key = %key, "Disk cache stem collision");
            return None;
        }

        let path = self.body_path(key);
        if let Ok(body) = fs::read(&path).await {
            trace!(key = %key, path = %path.display(), "Disk cache hit");
            Some(CacheEntry {
                metadata,
                body: Bytes::from(body),
            })
        } else {
            trace!(key = %key, "Disk cache miss");
            None
        }
    }

    /// Writes an entry to disk, replacing any previous one under the same key.
    ///
    /// # Errors
    /// Returns error if either file cannot be written.
    pub async fn put(&self, entry: &CacheEntry) -> CacheResult<()> {
        let key = entry.key();
        let path = self.body_path(key);

        let old_size = fs::metadata(&path).await.map(|m| m.len()).ok();

        let meta = serde_json::to_vec(&entry.metadata)
            .map_err(|e| CacheError::MetadataError(e.to_string()))?;
        write_file(&self.meta_path(key), &meta).await?;
        write_file(&path, &entry.body).await?;

        let new_size = entry.body.len() as u64;
        if let Some(old) = old_size {
            if new_size > old {
                self.current_size
                    .fetch_add(new_size - old, Ordering::Relaxed);
            } else {
                self.current_size
                    .fetch_sub(old - new_size, Ordering::Relaxed);
            }
        } else {
            self.current_size.fetch_add(new_size, Ordering::Relaxed);
            self.item_count.fetch_add(1, Ordering::Relaxed);
        }

        debug!(key = %key, path = %path.display(), size = new_size, "Stored entry in disk cache");

        self.cleanup_if_needed().await;

        Ok(())
    }

    /// Returns the current cache size in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes least-recently-accessed entries once over the size limit,
    /// freeing an extra tenth of capacity as headroom.
    async fn cleanup_if_needed(&self) {
        let current_size = self.current_size();
        if current_size <= self.max_size {
            return;
        }

        debug!(
            current_size = current_size,
            max_size = self.max_size,
            "Disk cache over limit, cleaning up"
        );

        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            return;
        };

        let mut files: Vec<(PathBuf, std::time::SystemTime, u64)> = Vec::new();

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !has_ext(&path, BODY_EXT) {
                continue;
            }

            if let Ok(meta) = entry.metadata().await {
                let accessed = meta
                    .accessed()
                    .or_else(|_| meta.modified())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                files.push((path, accessed, meta.len()));
            }
        }

        files.sort_by_key(|(_, time, _)| *time);

        let mut freed_size = 0u64;
        let mut freed_count = 0usize;
        let target = current_size - self.max_size + (self.max_size / 10);

        for (path, _, size) in files {
            if freed_size >= target {
                break;
            }

            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove old cache file");
                continue;
            }
            let _ = fs::remove_file(path.with_extension(META_EXT)).await;
            trace!(path = %path.display(), "Removed old cache file");
            freed_size += size;
            freed_count += 1;
        }
        self.current_size.fetch_sub(freed_size, Ordering::Relaxed);
        self.item_count.fetch_sub(freed_count, Ordering::Relaxed);

        debug!(
            freed_size = freed_size,
            freed_count = freed_count,
            "Disk cache cleanup complete"
        );
    }
}

#[async_trait]
impl CacheStorePort for DiskCacheStore {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.get(key).await
    }

    async fn store(&self, entry: CacheEntry) {
        if let Err(e) = self.put(&entry).await {
            warn!(key = %entry.key(), error = %e, "Failed to write disk cache entry");
        }
    }
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

async fn write_file(path: &Path, bytes: &[u8]) -> CacheResult<()> {
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| CacheError::IoError(format!("Failed to create cache file: {e}")))?;

    file.write_all(bytes)
        .await
        .map_err(|e| CacheError::IoError(format!("Failed to write cache file: {e}")))?;

    file.flush()
        .await
        .map_err(|e| CacheError::IoError(format!("Failed to flush cache file: {e}")))
}

/// Returns the default cache directory path.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "linuxmobile", "unsplash-feed").map_or_else(
        || {
            std::env::temp_dir()
                .join("unsplash-feed")
                .join("cache")
                .join("responses")
        },
        |dirs| dirs.cache_dir().join("responses"),
    )
}
