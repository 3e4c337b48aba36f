//! Photo listing entities.

use std::fmt;

use uuid::Uuid;

/// Session-unique identifier assigned to each decoded listing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoId(Uuid);

impl PhotoId {
    /// Creates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One photo from the listing endpoint.
///
/// Dimensions are always positive, so [`MetadataRecord::image_ratio`] is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    id: PhotoId,
    height: u32,
    width: u32,
    color: String,
    author: String,
    small_url: String,
    thumb_url: String,
}

impl MetadataRecord {
    /// Creates a record, rejecting zero dimensions.
    #[must_use]
    pub fn new(
        height: u32,
        width: u32,
        color: impl Into<String>,
        author: impl Into<String>,
        small_url: impl Into<String>,
        thumb_url: impl Into<String>,
    ) -> Option<Self> {
        if height == 0 || width == 0 {
            return None;
        }

        Some(Self {
            id: PhotoId::generate(),
            height,
            width,
            color: color.into(),
            author: author.into(),
            small_url: small_url.into(),
            thumb_url: thumb_url.into(),
        })
    }

    #[must_use]
    pub const fn id(&self) -> PhotoId {
        self.id
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Dominant color as reported by the API (e.g. `#0c2626`).
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Author display name.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// URL of the small rendition, used for grid cells and prefetch.
    #[must_use]
    pub fn small_url(&self) -> &str {
        &self.small_url
    }

    #[must_use]
    pub fn thumb_url(&self) -> &str {
        &self.thumb_url
    }

    /// Height divided by width.
    #[must_use]
    pub fn image_ratio(&self) -> f64 {
        f64::from(self.height) / f64::from(self.width)
    }

    /// Height a cell needs to show the photo at `width` without distortion.
    #[must_use]
    pub fn display_height(&self, width: f64) -> f64 {
        self.image_ratio() * width
    }
}
