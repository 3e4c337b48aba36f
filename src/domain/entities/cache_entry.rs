//! Cache identity and stored response types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::domain::errors::FetchError;

/// Request identity used as the cache key.
///
/// All cached requests are plain GETs, so the canonical URL alone identifies one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Parses and canonicalizes a request URL.
    ///
    /// # Errors
    /// Returns `FetchError::BadUrl` if the string is not an absolute URL.
    pub fn from_url(url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::bad_url(url))?;
        Ok(Self(parsed.into()))
    }

    /// Returns the canonical URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a filesystem-safe name derived from the key.
    #[must_use]
    pub fn file_stem(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response metadata kept next to the cached body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Canonical key the entry was stored under.
    pub key: CacheKey,
    /// `Content-Type` header of the original response.
    pub content_type: Option<String>,
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
}

/// Previously fetched response body plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Entry metadata.
    pub metadata: EntryMetadata,
    /// Raw response body.
    pub body: Bytes,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(key: CacheKey, body: Bytes, content_type: Option<String>) -> Self {
        Self {
            metadata: EntryMetadata {
                key,
                content_type,
                stored_at: Utc::now(),
            },
            body,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &CacheKey {
        &self.metadata.key
    }

    /// Size charged against tier capacity.
    #[must_use]
    pub fn size(&self) -> usize {
        self.body.len()
    }
}
