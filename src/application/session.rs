//! One browsing session: the surface a presentation layer drives.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use super::cell_image::CellImageLoader;
use super::feed_controller::{FeedController, FeedSnapshot};
use super::observable::Subscription;
use super::prefetch_coordinator::{LookaheadOutcome, PrefetchCoordinator};
use crate::domain::entities::{ImageLoadedEvent, RequestStatus};
use crate::domain::ports::{ImageFetchPort, PhotoFeedPort};

pub struct BrowsingSession {
    controller: FeedController,
    prefetch: PrefetchCoordinator,
    cells: CellImageLoader,
}

impl BrowsingSession {
    /// Wires a session. Cell image results are delivered on `image_events`.
    #[must_use]
    pub fn new(
        feed: Arc<dyn PhotoFeedPort>,
        images: Arc<dyn ImageFetchPort>,
        image_events: mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> Self {
        let controller = FeedController::new(feed);
        Self {
            prefetch: PrefetchCoordinator::new(Arc::clone(&images), controller.clone()),
            cells: CellImageLoader::new(images, image_events),
            controller,
        }
    }

    /// Kicks off the initial load of page 1.
    pub fn start(&self) {
        info!("Starting browsing session");
        self.controller.spawn_load(1);
    }

    /// Pull-to-refresh: reloads page 1 and replaces the feed.
    pub fn pull_to_refresh(&self) -> bool {
        self.controller.spawn_load(1)
    }

    /// Lookahead signal with the about-to-be-visible rows.
    pub fn on_lookahead(&self, rows: &[usize]) -> LookaheadOutcome {
        self.prefetch.on_lookahead(rows)
    }

    /// Requests the image for `row`. Returns false if the row is not loaded.
    pub fn request_cell_image(&self, row: usize) -> bool {
        let feed = self.controller.feed_snapshot();
        let Some(record) = feed.get(row) else {
            return false;
        };
        self.cells.request(record);
        true
    }

    #[must_use]
    pub fn feed_snapshot(&self) -> FeedSnapshot {
        self.controller.feed_snapshot()
    }

    #[must_use]
    pub fn status(&self) -> RequestStatus {
        self.controller.status()
    }

    #[must_use]
    pub fn subscribe_feed(&self) -> Subscription<FeedSnapshot> {
        self.controller.subscribe_feed()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> Subscription<RequestStatus> {
        self.controller.subscribe_status()
    }

    #[must_use]
    pub const fn controller(&self) -> &FeedController {
        &self.controller
    }
}
