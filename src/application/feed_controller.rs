//! Paginated feed state machine.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::observable::{Observable, Subscription};
use crate::domain::entities::{MetadataRecord, RequestStatus};
use crate::domain::ports::PhotoFeedPort;

/// Immutable view of the feed as published to subscribers.
pub type FeedSnapshot = Arc<Vec<MetadataRecord>>;

#[derive(Debug)]
struct PaginationState {
    cursor: u32,
    in_flight: HashSet<u32>,
    exhausted: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            cursor: 1,
            in_flight: HashSet::new(),
            exhausted: false,
        }
    }
}

struct ControllerInner {
    source: Arc<dyn PhotoFeedPort>,
    state: Mutex<PaginationState>,
    feed: Observable<FeedSnapshot>,
    status: Observable<RequestStatus>,
}

/// Owns the ordered feed, the page cursor and the request status.
///
/// Page 1 replaces the feed, later pages append to it. At most one request
/// per page number runs at a time. Every state transition is published while
/// the state lock is held, so subscribers never observe interleaved updates.
#[derive(Clone)]
pub struct FeedController {
    inner: Arc<ControllerInner>,
}

impl FeedController {
    #[must_use]
    pub fn new(source: Arc<dyn PhotoFeedPort>) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                source,
                state: Mutex::new(PaginationState::default()),
                feed: Observable::new(Arc::new(Vec::new())),
                status: Observable::new(RequestStatus::Idle),
            }),
        }
    }

    /// Loads `page` and applies the result to the feed.
    ///
    /// Returns immediately when a request for the same page is already running.
    pub async fn load_page(&self, page: u32) {
        if !self.begin(page) {
            debug!(page, "Page already in flight, skipping");
            return;
        }
        self.run(page).await;
    }

    /// Reloads the first page, replacing the feed.
    pub async fn refresh(&self) {
        self.load_page(1).await;
    }

    /// Starts loading `page` on a background task.
    ///
    /// The in-flight reservation is taken before returning, so a second call for
    /// the same page is a no-op until the first completes.
    pub fn spawn_load(&self, page: u32) -> bool {
        if !self.begin(page) {
            debug!(page, "Page already in flight, skipping");
            return false;
        }
        let controller = self.clone();
        tokio::spawn(async move { controller.run(page).await });
        true
    }

    /// Advances the cursor and starts loading the next page in the background.
    ///
    /// Returns the page number requested, or `None` while the cursor's page is
    /// still loading or once the listing has run out.
    pub fn spawn_next_page(&self) -> Option<u32> {
        let next = {
            let mut state = self.inner.state.lock();
            if state.exhausted {
                debug!(cursor = state.cursor, "Listing exhausted, not paging");
                return None;
            }
            if state.in_flight.contains(&state.cursor) {
                debug!(page = state.cursor, "Current page still loading, not paging");
                return None;
            }
            let next = state.cursor.saturating_add(1);
            if !state.in_flight.insert(next) {
                debug!(page = next, "Next page already in flight, skipping");
                return None;
            }
            state.cursor = next;
            self.inner.status.publish(RequestStatus::InFlight);
            next
        };

        let controller = self.clone();
        tokio::spawn(async move { controller.run(next).await });
        Some(next)
    }

    /// Returns the current feed.
    #[must_use]
    pub fn feed_snapshot(&self) -> FeedSnapshot {
        self.inner.feed.current()
    }

    #[must_use]
    pub fn status(&self) -> RequestStatus {
        self.inner.status.current()
    }

    /// Highest page requested without failing.
    #[must_use]
    pub fn page_cursor(&self) -> u32 {
        self.inner.state.lock().cursor
    }

    /// True once a page past the first came back empty.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.inner.state.lock().exhausted
    }

    #[must_use]
    pub fn subscribe_feed(&self) -> Subscription<FeedSnapshot> {
        self.inner.feed.subscribe()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> Subscription<RequestStatus> {
        self.inner.status.subscribe()
    }

    fn begin(&self, page: u32) -> bool {
        let mut state = self.inner.state.lock();
        if !state.in_flight.insert(page) {
            return false;
        }
        if page == 1 {
            state.cursor = 1;
            state.exhausted = false;
        } else if page > state.cursor {
            state.cursor = page;
        }
        self.inner.status.publish(RequestStatus::InFlight);
        true
    }

    async fn run(&self, page: u32) {
        debug!(page, "Fetching listing page");
        let result = self.inner.source.fetch_metadata_page(page).await;

        let mut state = self.inner.state.lock();
        state.in_flight.remove(&page);

        // A refresh started while this page was loading.
        if page > state.cursor {
            debug!(page, cursor = state.cursor, "Discarding page overtaken by refresh");
            return;
        }

        match result {
            Ok(records) => {
                let count = records.len();
                if page == 1 {
                    self.inner.feed.publish(Arc::new(records));
                } else if count > 0 {
                    self.inner.feed.modify(|feed| {
                        let mut extended = Vec::with_capacity(feed.len() + count);
                        extended.extend(feed.iter().cloned());
                        extended.extend(records);
                        *feed = Arc::new(extended);
                        true
                    });
                } else {
                    state.exhausted = true;
                }

                let status = if count == 0 {
                    RequestStatus::SucceededEmpty
                } else {
                    RequestStatus::Succeeded
                };
                info!(page, count, "Listing page loaded");
                self.inner.status.publish(status);
            }
            Err(error) => {
                warn!(page, error = %error, "Listing page failed");
                if page > 1 && state.cursor == page {
                    state.cursor = page - 1;
                }
                self.inner.status.publish(RequestStatus::Failed(error));
            }
        }
    }
}

impl std::fmt::Debug for FeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("FeedController")
            .field("cursor", &state.cursor)
            .field("in_flight", &state.in_flight)
            .field("feed_len", &self.inner.feed.current().len())
            .finish_non_exhaustive()
    }
}
