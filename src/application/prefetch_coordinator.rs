//! Scroll-driven cache warming and pagination.

use std::sync::Arc;

use tracing::{debug, trace};

use super::feed_controller::FeedController;
use crate::domain::ports::ImageFetchPort;

/// Rows from the end of the feed at which the next page is requested.
pub const PAGINATION_THRESHOLD: usize = 3;

/// What a lookahead signal caused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookaheadOutcome {
    /// A cache warm was started for the row's image.
    pub warmed: bool,
    /// Page number requested from the listing, if any.
    pub requested_page: Option<u32>,
}

pub struct PrefetchCoordinator {
    images: Arc<dyn ImageFetchPort>,
    controller: FeedController,
}

impl PrefetchCoordinator {
    #[must_use]
    pub fn new(images: Arc<dyn ImageFetchPort>, controller: FeedController) -> Self {
        Self { images, controller }
    }

    /// Handles a batch of about-to-be-visible rows; only the first row is acted on.
    pub fn on_lookahead(&self, rows: &[usize]) -> LookaheadOutcome {
        rows.first()
            .map(|&row| self.handle_row(row))
            .unwrap_or_default()
    }

    /// Warms the cache for `row` and requests the next page when `row` is the
    /// third-from-last loaded record.
    pub fn handle_row(&self, row: usize) -> LookaheadOutcome {
        let feed = self.controller.feed_snapshot();
        let Some(record) = feed.get(row) else {
            trace!(row, len = feed.len(), "Lookahead row out of bounds");
            return LookaheadOutcome::default();
        };

        self.images.warm_cache(record.small_url());

        let at_boundary = feed.len().checked_sub(PAGINATION_THRESHOLD) == Some(row);
        let requested_page = if at_boundary {
            let page = self.controller.spawn_next_page();
            debug!(row, ?page, "Reached pagination boundary");
            page
        } else {
            None
        };

        LookaheadOutcome {
            warmed: true,
            requested_page,
        }
    }
}
