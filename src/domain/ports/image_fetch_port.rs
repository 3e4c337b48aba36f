//! Port for cache-aware image loading.

use async_trait::async_trait;

use crate::domain::entities::LoadedImage;
use crate::domain::errors::FetchError;

/// Port for loading images, checking the cache before the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Loads and decodes the image at `url`.
    async fn fetch_image(&self, url: &str) -> Result<LoadedImage, FetchError>;

    /// Starts a detached download that only populates the cache.
    /// Nothing is reported back and failures are swallowed.
    fn warm_cache(&self, url: &str);
}
