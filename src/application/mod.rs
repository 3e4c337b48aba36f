//! Application layer: feed pagination, prefetching and session wiring.

/// Per-cell image requests.
pub mod cell_image;
/// Paginated feed state.
pub mod feed_controller;
/// Latest-value observables.
pub mod observable;
/// Scroll-driven prefetching.
pub mod prefetch_coordinator;
/// Application services.
pub mod services;
/// Browsing session wiring.
pub mod session;

pub use cell_image::CellImageLoader;
pub use feed_controller::{FeedController, FeedSnapshot};
pub use observable::{Observable, Subscription};
pub use prefetch_coordinator::{LookaheadOutcome, PAGINATION_THRESHOLD, PrefetchCoordinator};
pub use services::NotificationManager;
pub use session::BrowsingSession;
