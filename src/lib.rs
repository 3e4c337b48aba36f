//! unsplash-feed - An infinite-scrolling Unsplash photo feed.
//!
//! This crate provides the image acquisition pipeline behind a photo grid:
//! paginated metadata fetching, scroll-driven prefetching and a tiered
//! memory/disk response cache.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing pagination, prefetching and session wiring.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "unsplash-feed";
