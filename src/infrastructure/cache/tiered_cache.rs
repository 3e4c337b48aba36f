//! Two-tier cache store: memory in front of disk.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::entities::{CacheEntry, CacheKey};
use crate::domain::errors::CacheResult;
use crate::domain::ports::CacheStorePort;

use super::disk_cache::DiskCacheStore;
use super::memory_cache::{CacheStats, MemoryCacheStore};

/// Cache store with independent memory and disk capacity limits.
///
/// Lookups check memory first and promote disk hits into memory.
/// Stores write through to both tiers.
pub struct TieredCacheStore {
    memory: Arc<MemoryCacheStore>,
    disk: Option<Arc<DiskCacheStore>>,
}

impl TieredCacheStore {
    /// Creates a store over both tiers.
    #[must_use]
    pub const fn new(memory: Arc<MemoryCacheStore>, disk: Arc<DiskCacheStore>) -> Self {
        Self {
            memory,
            disk: Some(disk),
        }
    }

    /// Creates a store without a disk tier.
    #[must_use]
    pub const fn memory_only(memory: Arc<MemoryCacheStore>) -> Self {
        Self { memory, disk: None }
    }

    /// Opens a store with the given capacities. A `None` directory uses the
    /// platform cache location.
    ///
    /// # Errors
    /// Returns error if the disk directory cannot be created.
    pub async fn open(
        memory_capacity: usize,
        disk_capacity: u64,
        disk_dir: Option<std::path::PathBuf>,
    ) -> CacheResult<Self> {
        let memory = Arc::new(MemoryCacheStore::new(memory_capacity));
        let disk = match disk_dir {
            Some(dir) => DiskCacheStore::new(dir, disk_capacity).await?,
            None => DiskCacheStore::default_location(disk_capacity).await?,
        };
        info!(
            memory_capacity,
            disk_capacity,
            dir = %disk.cache_dir().display(),
            "Opened response cache"
        );
        Ok(Self::new(memory, Arc::new(disk)))
    }

    /// Returns memory tier statistics.
    pub async fn memory_stats(&self) -> CacheStats {
        self.memory.stats().await
    }

    /// Returns the disk tier size in bytes, if a disk tier is attached.
    #[must_use]
    pub fn disk_size(&self) -> Option<u64> {
        self.disk.as_ref().map(|d| d.current_size())
    }
}

#[async_trait]
impl CacheStorePort for TieredCacheStore {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        if let Some(entry) = self.memory.lookup(key).await {
            return Some(entry);
        }

        let disk = self.disk.as_ref()?;
        let entry = disk.lookup(key).await?;
        debug!(key = %key, "Promoting disk cache entry to memory");
        self.memory.store(entry.clone()).await;
        Some(entry)
    }

    async fn store(&self, entry: CacheEntry) {
        if let Some(disk) = &self.disk {
            disk.store(entry.clone()).await;
        }
        self.memory.store(entry).await;
    }
}
