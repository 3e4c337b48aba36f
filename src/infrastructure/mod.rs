//! Infrastructure layer with external service adapters.

/// Response cache tiers.
pub mod cache;
/// Application configuration.
pub mod config;
/// Unsplash API client.
pub mod unsplash;

pub use cache::{CacheStats, DiskCacheStore, MemoryCacheStore, TieredCacheStore};
pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use unsplash::{FetchClientConfig, ReqwestTransport, UnsplashClient};
