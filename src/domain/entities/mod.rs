//! Domain entity definitions.

mod cache_entry;
mod image;
mod photo;
mod request_status;
mod token;

pub use cache_entry::{CacheEntry, CacheKey, EntryMetadata};
pub use image::{ImageLoadedEvent, ImageSource, LoadedImage};
pub use photo::{MetadataRecord, PhotoId};
pub use request_status::RequestStatus;
pub use token::AccessToken;
