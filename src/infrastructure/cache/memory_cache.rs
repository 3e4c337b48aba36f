//! In-memory LRU response cache bounded by total body size.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::{CacheEntry, CacheKey};
use crate::domain::ports::CacheStorePort;

/// Default memory tier capacity (6 MiB).
pub const DEFAULT_MEMORY_CAPACITY: usize = 6 * 1024 * 1024;

struct MemoryTier {
    entries: LruCache<CacheKey, CacheEntry>,
    resident: usize,
}

/// Fast cache tier. Evicts least-recently-used entries once the summed body
/// size exceeds its capacity; entries larger than the whole capacity are not kept.
pub struct MemoryCacheStore {
    tier: RwLock<MemoryTier>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCacheStore {
    /// Creates a new cache holding at most `capacity` bytes of bodies.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            tier: RwLock::new(MemoryTier {
                entries: LruCache::unbounded(),
                resident: 0,
            }),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns cache statistics.
    #[allow(clippy::cast_precision_loss)]
    pub async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let tier = self.tier.read().await;
        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: tier.entries.len(),
            resident_bytes: tier.resident,
        }
    }

    /// Peeks at an entry without promoting it in the LRU.
    pub async fn peek(&self, key: &CacheKey) -> Option<CacheEntry> {
        let tier = self.tier.read().await;
        tier.entries.peek(key).cloned()
    }

    /// Total body bytes currently held.
    pub async fn resident_bytes(&self) -> usize {
        self.tier.read().await.resident
    }

    pub async fn len(&self) -> usize {
        self.tier.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut tier = self.tier.write().await;
        tier.entries.clear();
        tier.resident = 0;
        debug!("Cleared memory cache");
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached entries.
    pub entries: usize,
    /// Summed body size of cached entries.
    pub resident_bytes: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} entries ({} bytes), {:.1}% hit rate ({} hits, {} misses)",
            self.entries, self.resident_bytes, self.hit_rate, self.hits, self.misses
        )
    }
}

#[async_trait]
impl CacheStorePort for MemoryCacheStore {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut tier = self.tier.write().await;
        if let Some(entry) = tier.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
            Some(entry.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
            None
        }
    }

    async fn store(&self, entry: CacheEntry) {
        let mut tier = self.tier.write().await;
        let size = entry.size();

        if let Some(old) = tier.entries.pop(entry.key()) {
            tier.resident -= old.size();
        }

        if size > self.capacity {
            debug!(key = %entry.key(), size, capacity = self.capacity, "Entry exceeds memory capacity, not cached");
            return;
        }

        debug!(key = %entry.key(), size, "Storing entry in memory cache");
        tier.resident += size;
        tier.entries.put(entry.key().clone(), entry);

        while tier.resident > self.capacity {
            let Some((key, evicted)) = tier.entries.pop_lru() else {
                break;
            };
            tier.resident -= evicted.size();
            trace!(key = %key, "Evicted entry from memory cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn entry(name: &str, size: usize) -> CacheEntry {
        let key = CacheKey::from_url(&format!("https://images.unsplash.com/{name}")).unwrap();
        CacheEntry::new(key, Bytes::from(vec![7u8; size]), None)
    }

    #[tokio::test]
    async fn test_store_and_lookup() {
        let cache = MemoryCacheStore::new(1024);
        let e = entry("a", 10);

        cache.store(e.clone()).await;
        let found = cache.lookup(e.key()).await;

        assert_eq!(found, Some(e));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = MemoryCacheStore::new(1024);
        assert!(cache.lookup(entry("missing", 1).key()).await.is_none());
    }

    #[tokio::test]
    async fn test_eviction_keeps_capacity_bound() {
        let cache = MemoryCacheStore::new(100);
        let a = entry("a", 40);
        let b = entry("b", 40);
        let c = entry("c", 40);

        cache.store(a.clone()).await;
        cache.store(b.clone()).await;
        cache.store(c.clone()).await;

        // a is least recently used
        assert!(cache.peek(a.key()).await.is_none());
        assert!(cache.peek(b.key()).await.is_some());
        assert!(cache.peek(c.key()).await.is_some());
        assert_eq!(cache.resident_bytes().await, 80);
    }

    #[tokio::test]
    async fn test_lookup_promotes() {
        let cache = MemoryCacheStore::new(100);
        let a = entry("a", 40);
        let b = entry("b", 40);

        cache.store(a.clone()).await;
        cache.store(b.clone()).await;
        let _ = cache.lookup(a.key()).await;
        cache.store(entry("c", 40)).await;

        assert!(cache.peek(a.key()).await.is_some());
        assert!(cache.peek(b.key()).await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_size() {
        let cache = MemoryCacheStore::new(100);
        cache.store(entry("a", 60)).await;
        cache.store(entry("a", 10)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.resident_bytes().await, 10);
    }

    #[tokio::test]
    async fn test_oversized_entry_not_cached() {
        let cache = MemoryCacheStore::new(10);
        let big = entry("big", 11);

        cache.store(big.clone()).await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.resident_bytes().await, 0);
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let cache = MemoryCacheStore::new(1024);
        let e = entry("a", 5);
        cache.store(e.clone()).await;

        let _ = cache.lookup(e.key()).await;
        let _ = cache.lookup(entry("missing", 1).key()).await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.resident_bytes, 5);
    }
}
