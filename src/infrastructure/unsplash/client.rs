//! Unsplash fetch client: listing pages and cache-aware image downloads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::domain::entities::{
    AccessToken, CacheEntry, CacheKey, ImageSource, LoadedImage, MetadataRecord,
};
use crate::domain::errors::FetchError;
use crate::domain::ports::{
    CacheStorePort, HttpRequest, HttpResponse, HttpTransport, ImageFetchPort, PhotoFeedPort,
};

use super::dto::decode_listing;
use super::retry::{DEFAULT_MAX_ATTEMPTS, with_retry};

/// Public Unsplash API root.
pub const UNSPLASH_API_BASE: &str = "https://api.unsplash.com";

/// Tunables for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchClientConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Records requested per listing page.
    pub per_page: u32,
    /// Deadline for each image download attempt.
    pub image_timeout: Duration,
    /// Attempts per logical request.
    pub max_attempts: u32,
    /// Maximum concurrent image downloads.
    pub max_concurrent_downloads: usize,
}

impl Default for FetchClientConfig {
    fn default() -> Self {
        Self {
            base_url: UNSPLASH_API_BASE.to_string(),
            per_page: 10,
            image_timeout: Duration::from_secs(10),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_concurrent_downloads: 4,
        }
    }
}

struct ClientInner {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn CacheStorePort>,
    token: AccessToken,
    config: FetchClientConfig,
    download_permits: Semaphore,
}

/// Fetches listing pages and images. Cheap to clone; clones share the
/// transport, cache store and download limit.
#[derive(Clone)]
pub struct UnsplashClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for UnsplashClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsplashClient")
            .field("config", &self.inner.config)
            .field("token", &self.inner.token)
            .finish_non_exhaustive()
    }
}

impl UnsplashClient {
    /// Creates a client over the given transport and cache store.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn CacheStorePort>,
        token: AccessToken,
        config: FetchClientConfig,
    ) -> Self {
        let permits = config.max_concurrent_downloads.max(1);
        Self {
            inner: Arc::new(ClientInner {
                transport,
                cache,
                token,
                config,
                download_permits: Semaphore::new(permits),
            }),
        }
    }

    /// Builds the listing URL for `page`.
    fn listing_url(&self, page: u32) -> Result<Url, FetchError> {
        let raw = format!("{}/photos", self.inner.config.base_url.trim_end_matches('/'));
        if page == 0 {
            return Err(FetchError::bad_url(format!("{raw}?page=0")));
        }
        Url::parse_with_params(
            &raw,
            &[
                ("page", page.to_string()),
                ("per_page", self.inner.config.per_page.to_string()),
            ],
        )
        .map_err(|_| FetchError::bad_url(raw))
    }

    /// Fetches one listing page. Never cached.
    ///
    /// # Errors
    /// `BadUrl` for page 0 or a malformed base URL, `BadServerResponse` for a
    /// non-200 answer, `CannotDecode` for a body that does not match the schema.
    pub async fn fetch_metadata_page(&self, page: u32) -> Result<Vec<MetadataRecord>, FetchError> {
        let url = self.listing_url(page)?;
        let request = HttpRequest::get(url).with_authorization(self.inner.token.authorization_header());

        debug!(page, "Requesting listing page");

        let response = with_retry(self.inner.config.max_attempts, "listing", || {
            let request = request.clone();
            async move { self.execute_checked(request).await }
        })
        .await?;

        let records = decode_listing(&response.body).inspect_err(|e| {
            warn!(page, error = %e, "Failed to decode listing page");
        })?;

        info!(page, count = records.len(), "Listing page fetched");
        Ok(records)
    }

    /// Loads an image, serving from the cache when possible.
    ///
    /// # Errors
    /// `BadUrl`, `Timeout`, `BadServerResponse`, `CannotDecode` or `Transport`.
    /// Nothing is written to the cache on failure.
    pub async fn fetch_image(&self, url: &str) -> Result<LoadedImage, FetchError> {
        let (parsed, key) = parse_image_url(url)?;

        if let Some(entry) = self.inner.cache.lookup(&key).await {
            match decode_image(entry.body.clone()).await {
                Ok(image) => {
                    debug!(key = %key, "Image served from cache");
                    return Ok(LoadedImage {
                        url: url.to_string(),
                        image: Arc::new(image),
                        bytes: entry.body,
                        source: ImageSource::Cache,
                    });
                }
                Err(e) => warn!(key = %key, error = %e, "Cached image undecodable, refetching"),
            }
        }

        let response = self.download(parsed).await?;
        let image = decode_image(response.body.clone()).await?;

        self.inner
            .cache
            .store(CacheEntry::new(key, response.body.clone(), response.content_type))
            .await;

        debug!(url, source = %ImageSource::Network, "Image loaded");

        Ok(LoadedImage {
            url: url.to_string(),
            image: Arc::new(image),
            bytes: response.body,
            source: ImageSource::Network,
        })
    }

    /// Populates the cache for `url` if it is not there yet.
    /// Never fails; every error is logged and dropped.
    pub async fn prime_cache(&self, url: &str) {
        let Ok((parsed, key)) = parse_image_url(url) else {
            debug!(url, "Skipping warm-up for malformed URL");
            return;
        };

        if self.inner.cache.lookup(&key).await.is_some() {
            return;
        }

        let response = match self.download(parsed).await {
            Ok(response) => response,
            Err(e) => {
                debug!(url, error = %e, "Cache warm-up failed");
                return;
            }
        };

        if let Err(e) = image::guess_format(&response.body) {
            debug!(url, error = %e, "Cache warm-up fetched a non-image body");
            return;
        }

        self.inner
            .cache
            .store(CacheEntry::new(key, response.body, response.content_type))
            .await;
        debug!(url, "Cache warmed");
    }

    /// Downloads an image body with the per-attempt deadline and retry policy.
    async fn download(&self, url: Url) -> Result<HttpResponse, FetchError> {
        let _permit = self
            .inner
            .download_permits
            .acquire()
            .await
            .map_err(|_| FetchError::transport("download limiter closed"))?;

        let timeout = self.inner.config.image_timeout;
        let request = HttpRequest::get(url);

        with_retry(self.inner.config.max_attempts, "image", || {
            let request = request.clone();
            async move {
                tokio::time::timeout(timeout, self.execute_checked(request))
                    .await
                    .map_err(|_| FetchError::Timeout {
                        seconds: timeout.as_secs(),
                    })?
            }
        })
        .await
    }

    async fn execute_checked(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let response = self.inner.transport.execute(request).await?;
        if response.is_ok() {
            Ok(response)
        } else {
            Err(FetchError::BadServerResponse {
                status: response.status,
            })
        }
    }
}

fn parse_image_url(url: &str) -> Result<(Url, CacheKey), FetchError> {
    let parsed = Url::parse(url).map_err(|_| FetchError::bad_url(url))?;
    let key = CacheKey::from_url(parsed.as_str())?;
    Ok((parsed, key))
}

async fn decode_image(bytes: Bytes) -> Result<image::DynamicImage, FetchError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| FetchError::cannot_decode(format!("decode task panicked: {e}")))?
        .map_err(|e| FetchError::cannot_decode(format!("failed to decode image: {e}")))
}

#[async_trait]
impl PhotoFeedPort for UnsplashClient {
    async fn fetch_metadata_page(&self, page: u32) -> Result<Vec<MetadataRecord>, FetchError> {
        Self::fetch_metadata_page(self, page).await
    }
}

#[async_trait]
impl ImageFetchPort for UnsplashClient {
    async fn fetch_image(&self, url: &str) -> Result<LoadedImage, FetchError> {
        Self::fetch_image(self, url).await
    }

    fn warm_cache(&self, url: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(url, "No runtime available, skipping cache warm-up");
            return;
        };
        let client = self.clone();
        let url = url.to_string();
        // Detached: the handle is dropped and the result discarded.
        drop(handle.spawn(async move { client.prime_cache(&url).await }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::{ScriptedTransport, ok, status};
    use crate::infrastructure::cache::MemoryCacheStore;
    use std::io::Cursor;
    use test_case::test_case;

    const IMAGE_URL: &str = "https://images.unsplash.com/photo-1?w=400";

    fn png_bytes() -> Bytes {
        let mut buf = Vec::new();
        image::DynamicImage::new_rgb8(3, 2)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    fn listing_body() -> Bytes {
        Bytes::from_static(
            br##"[{"id":"a","width":6000,"height":4000,"color":"#60544D","likes":3,
                "user":{"name":"Gilbert Kane","username":"gk"},
                "urls":{"small":"https://images.unsplash.com/a?w=400","thumb":"https://images.unsplash.com/a?w=200"}}]"##,
        )
    }

    fn client_with(
        transport: Arc<ScriptedTransport>,
        config: FetchClientConfig,
    ) -> (UnsplashClient, Arc<MemoryCacheStore>) {
        let cache = Arc::new(MemoryCacheStore::new(1024 * 1024));
        let client = UnsplashClient::new(
            transport,
            cache.clone(),
            AccessToken::new("test-access-key").unwrap(),
            config,
        );
        (client, cache)
    }

    fn client(transport: Arc<ScriptedTransport>) -> (UnsplashClient, Arc<MemoryCacheStore>) {
        client_with(transport, FetchClientConfig::default())
    }

    #[tokio::test]
    async fn test_listing_request_shape() {
        let transport = Arc::new(ScriptedTransport::always(ok(listing_body())));
        let (client, _) = client(transport.clone());

        let records = client.fetch_metadata_page(2).await.unwrap();

        assert_eq!(records.len(), 1);
        assert!((records[0].image_ratio() - 0.6667).abs() < 1e-3);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url.as_str(),
            "https://api.unsplash.com/photos?page=2&per_page=10"
        );
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Client-ID test-access-key")
        );
    }

    #[tokio::test]
    async fn test_listing_page_zero_is_bad_url() {
        let transport = Arc::new(ScriptedTransport::always(ok(listing_body())));
        let (client, _) = client(transport.clone());

        let err = client.fetch_metadata_page(0).await.unwrap_err();

        assert!(matches!(err, FetchError::BadUrl { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_listing_retries_transport_failures() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(FetchError::transport("reset")),
            Err(FetchError::transport("reset")),
            ok(listing_body()),
        ]));
        let (client, _) = client(transport.clone());

        assert_eq!(client.fetch_metadata_page(1).await.unwrap().len(), 1);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_listing_non_200_exhausts_attempts() {
        let transport = Arc::new(ScriptedTransport::always(status(401)));
        let (client, _) = client(transport.clone());

        let err = client.fetch_metadata_page(1).await.unwrap_err();

        assert_eq!(err, FetchError::BadServerResponse { status: 401 });
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_listing_recovers_after_server_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(500), ok(listing_body())]));
        let (client, _) = client(transport.clone());

        assert_eq!(client.fetch_metadata_page(1).await.unwrap().len(), 1);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_listing_schema_mismatch() {
        let transport = Arc::new(ScriptedTransport::always(ok(&b"{\"errors\":[]}"[..])));
        let (client, _) = client(transport);

        let err = client.fetch_metadata_page(1).await.unwrap_err();
        assert!(matches!(err, FetchError::CannotDecode { .. }));
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let transport = Arc::new(ScriptedTransport::always(ok(png_bytes())));
        let (client, _) = client(transport.clone());

        let first = client.fetch_image(IMAGE_URL).await.unwrap();
        let second = client.fetch_image(IMAGE_URL).await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first.source, ImageSource::Network);
        assert_eq!(second.source, ImageSource::Cache);
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(second.image.width(), 3);
    }

    #[test_case(404 ; "not_found")]
    #[test_case(403 ; "forbidden")]
    #[test_case(503 ; "service_unavailable")]
    #[tokio::test]
    async fn test_non_200_image_fails_after_three_attempts(code: u16) {
        let transport = Arc::new(ScriptedTransport::always(status(code)));
        let (client, cache) = client(transport.clone());

        let err = client.fetch_image(IMAGE_URL).await.unwrap_err();

        assert_eq!(err, FetchError::BadServerResponse { status: code });
        assert_eq!(transport.calls(), 3);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_undecodable_image_not_cached() {
        let transport = Arc::new(ScriptedTransport::always(ok(&b"not an image"[..])));
        let (client, cache) = client(transport.clone());

        let err = client.fetch_image(IMAGE_URL).await.unwrap_err();

        assert!(matches!(err, FetchError::CannotDecode { .. }));
        assert_eq!(transport.calls(), 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_image_timeout() {
        let transport = Arc::new(
            ScriptedTransport::always(ok(png_bytes())).with_delay(Duration::from_millis(500)),
        );
        let config = FetchClientConfig {
            image_timeout: Duration::from_millis(20),
            ..FetchClientConfig::default()
        };
        let (client, cache) = client_with(transport.clone(), config);

        let err = client.fetch_image(IMAGE_URL).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }));
        assert_eq!(transport.calls(), 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_image_url() {
        let transport = Arc::new(ScriptedTransport::always(ok(png_bytes())));
        let (client, _) = client(transport.clone());

        let err = client.fetch_image("images/photo-1").await.unwrap_err();

        assert!(matches!(err, FetchError::BadUrl { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_prime_cache_swallows_failures() {
        let transport = Arc::new(ScriptedTransport::always(Err(FetchError::transport("down"))));
        let (client, cache) = client(transport.clone());

        client.prime_cache(IMAGE_URL).await;

        assert_eq!(transport.calls(), 3);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_prime_cache_then_fetch_is_offline() {
        let transport = Arc::new(ScriptedTransport::always(ok(png_bytes())));
        let (client, _) = client(transport.clone());

        client.prime_cache(IMAGE_URL).await;
        client.prime_cache(IMAGE_URL).await;
        let loaded = client.fetch_image(IMAGE_URL).await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(loaded.source, ImageSource::Cache);
    }

    async fn wait_for_detached(client: &UnsplashClient) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while Arc::strong_count(&client.inner) > 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_warm_cache_populates_store_in_background() {
        let transport = Arc::new(ScriptedTransport::always(ok(png_bytes())));
        let (client, cache) = client(transport.clone());

        <UnsplashClient as ImageFetchPort>::warm_cache(&client, IMAGE_URL);
        wait_for_detached(&client).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(transport.calls(), 1);
        let loaded = client.fetch_image(IMAGE_URL).await.unwrap();
        assert_eq!(loaded.source, ImageSource::Cache);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_warm_cache_failure_leaves_store_empty() {
        let transport = Arc::new(ScriptedTransport::always(status(500)));
        let (client, cache) = client(transport.clone());

        <UnsplashClient as ImageFetchPort>::warm_cache(&client, IMAGE_URL);
        wait_for_detached(&client).await;

        assert_eq!(transport.calls(), 3);
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_warm_cache_without_runtime_is_noop() {
        let transport = Arc::new(ScriptedTransport::always(ok(png_bytes())));
        let (client, _) = client(transport.clone());

        <UnsplashClient as ImageFetchPort>::warm_cache(&client, IMAGE_URL);

        assert_eq!(transport.calls(), 0);
        assert_eq!(Arc::strong_count(&client.inner), 1);
    }

    #[tokio::test]
    async fn test_prime_cache_rejects_non_image() {
        let transport = Arc::new(ScriptedTransport::always(ok(&b"<html></html>"[..])));
        let (client, cache) = client(transport);

        client.prime_cache(IMAGE_URL).await;

        assert!(cache.is_empty().await);
    }
}
