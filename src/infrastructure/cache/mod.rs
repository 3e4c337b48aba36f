//! Response cache infrastructure.
//!
//! This module provides:
//! - A byte-bounded LRU memory tier
//! - A byte-bounded disk tier
//! - A tiered store combining both

pub mod disk_cache;
pub mod memory_cache;
pub mod tiered_cache;

pub use disk_cache::{DEFAULT_DISK_CAPACITY, DiskCacheStore};
pub use memory_cache::{CacheStats, DEFAULT_MEMORY_CAPACITY, MemoryCacheStore};
pub use tiered_cache::TieredCacheStore;
