//! Unsplash API adapters.

pub mod client;
pub mod dto;
pub mod retry;
pub mod transport;

pub use client::{FetchClientConfig, UNSPLASH_API_BASE, UnsplashClient};
pub use retry::{DEFAULT_MAX_ATTEMPTS, with_retry};
pub use transport::ReqwestTransport;
