//! Domain types for decoded images.

use std::sync::Arc;

use bytes::Bytes;

use super::PhotoId;
use crate::domain::errors::FetchError;

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the cache store.
    Cache,
    /// Downloaded from network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A decoded image together with the raw bytes it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Request URL.
    pub url: String,
    /// Decoded pixels.
    pub image: Arc<image::DynamicImage>,
    /// Encoded body as received or cached.
    pub bytes: Bytes,
    /// Where the bytes came from.
    pub source: ImageSource,
}

/// Message sent when a cell image finishes loading.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// Photo the image belongs to.
    pub photo_id: PhotoId,
    /// Author name shown alongside the image.
    pub author: String,
    /// The loaded image, or the reason the cell stays empty.
    pub result: Result<LoadedImage, FetchError>,
}
