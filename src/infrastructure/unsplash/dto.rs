use serde::Deserialize;

use crate::domain::entities::MetadataRecord;
use crate::domain::errors::FetchError;

/// One element of the `GET /photos` response array.
/// Only the fields the feed uses are declared; the rest are ignored.
#[derive(Debug, Deserialize)]
pub struct PhotoResponse {
    /// Original height in pixels.
    pub height: u32,
    /// Original width in pixels.
    pub width: u32,
    /// Dominant color hex string.
    pub color: String,
    /// Uploading user.
    pub user: UserResponse,
    /// Rendition URLs.
    pub urls: UrlsResponse,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    /// Display name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlsResponse {
    /// 400px-wide rendition.
    pub small: String,
    /// 200px-wide rendition.
    pub thumb: String,
}

impl TryFrom<PhotoResponse> for MetadataRecord {
    type Error = FetchError;

    fn try_from(photo: PhotoResponse) -> Result<Self, Self::Error> {
        Self::new(
            photo.height,
            photo.width,
            photo.color,
            photo.user.name,
            photo.urls.small,
            photo.urls.thumb,
        )
        .ok_or_else(|| {
            FetchError::cannot_decode(format!(
                "photo has non-positive dimensions {}x{}",
                photo.width, photo.height
            ))
        })
    }
}

/// Decodes a listing page body.
///
/// # Errors
/// Returns `FetchError::CannotDecode` when the body does not match the schema.
pub fn decode_listing(body: &[u8]) -> Result<Vec<MetadataRecord>, FetchError> {
    let photos: Vec<PhotoResponse> =
        serde_json::from_slice(body).map_err(|e| FetchError::cannot_decode(e.to_string()))?;
    photos.into_iter().map(MetadataRecord::try_from).collect()
}
