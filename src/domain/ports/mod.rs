mod cache_store_port;
mod http_transport_port;
mod image_fetch_port;
mod photo_feed_port;

pub use cache_store_port::CacheStorePort;
pub use http_transport_port::{HttpRequest, HttpResponse, HttpTransport};
pub use image_fetch_port::ImageFetchPort;
pub use photo_feed_port::PhotoFeedPort;
