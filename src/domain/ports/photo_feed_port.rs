//! Port for paginated photo listings.

use async_trait::async_trait;

use crate::domain::entities::MetadataRecord;
use crate::domain::errors::FetchError;

/// Port for fetching one page of photo metadata.
#[async_trait]
pub trait PhotoFeedPort: Send + Sync {
    /// Fetches page `page` (1-based) of the listing.
    async fn fetch_metadata_page(&self, page: u32) -> Result<Vec<MetadataRecord>, FetchError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::sync::Semaphore;

    /// Builds `count` distinct records for tests.
    pub fn records(count: usize) -> Vec<MetadataRecord> {
        (0..count)
            .map(|i| {
                MetadataRecord::new(
                    400,
                    600,
                    "#101010",
                    format!("author {i}"),
                    format!("https://images.unsplash.com/photo-{i}?w=400"),
                    format!("https://images.unsplash.com/photo-{i}?w=200"),
                )
                .unwrap()
            })
            .collect()
    }

    /// Photo feed serving scripted pages and recording requested page numbers.
    pub struct MockPhotoFeed {
        pages: Mutex<HashMap<u32, Result<Vec<MetadataRecord>, FetchError>>>,
        requested: Mutex<Vec<u32>>,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Semaphore>>,
    }

    impl MockPhotoFeed {
        pub fn new() -> Self {
            Self {
                pages: Mutex::new(HashMap::new()),
                requested: Mutex::new(Vec::new()),
                calls: Arc::new(AtomicUsize::new(0)),
                gate: None,
            }
        }

        pub fn with_page(self, page: u32, result: Result<Vec<MetadataRecord>, FetchError>) -> Self {
            self.pages.lock().insert(page, result);
            self
        }

        /// Rescripts a page after construction.
        pub fn set_page(&self, page: u32, result: Result<Vec<MetadataRecord>, FetchError>) {
            self.pages.lock().insert(page, result);
        }

        /// Holds every fetch until a permit is added to the returned semaphore.
        pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
            let gate = Arc::new(Semaphore::new(0));
            self.gate = Some(gate.clone());
            (self, gate)
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requested(&self) -> Vec<u32> {
            self.requested.lock().clone()
        }
    }

    #[async_trait]
    impl PhotoFeedPort for MockPhotoFeed {
        async fn fetch_metadata_page(&self, page: u32) -> Result<Vec<MetadataRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().push(page);

            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            self.pages
                .lock()
                .get(&page)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}
