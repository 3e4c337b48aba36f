//! Port definition for response caching.

use async_trait::async_trait;

use crate::domain::entities::{CacheEntry, CacheKey};

/// Port for the response cache.
///
/// Storage is best-effort: implementations evict under capacity pressure and
/// swallow their own I/O failures, so callers must never assume an entry persists.
#[async_trait]
pub trait CacheStorePort: Send + Sync {
    /// Returns the entry stored under `key`, if any. Never touches the network.
    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Inserts or overwrites the entry under its key.
    async fn store(&self, entry: CacheEntry);
}
