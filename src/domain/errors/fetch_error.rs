//! Fetch pipeline error types.

use thiserror::Error;

/// Errors surfaced by metadata and image fetches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    /// Request URL could not be constructed.
    #[error("malformed request URL: {url}")]
    BadUrl { url: String },

    /// Image request exceeded its deadline.
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Server answered with an unexpected status code.
    #[error("unexpected server response: HTTP {status}")]
    BadServerResponse { status: u16 },

    /// Body is not a valid image or does not match the listing schema.
    #[error("cannot decode response: {reason}")]
    CannotDecode { reason: String },

    /// Generic network failure.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl FetchError {
    /// Creates bad URL error.
    #[must_use]
    pub fn bad_url(url: impl Into<String>) -> Self {
        Self::BadUrl { url: url.into() }
    }

    /// Creates decode error.
    #[must_use]
    pub fn cannot_decode(reason: impl Into<String>) -> Self {
        Self::CannotDecode {
            reason: reason.into(),
        }
    }

    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns whether another attempt may succeed.
    ///
    /// Any non-200 answer is retried alongside transport errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::BadServerResponse { .. }
        )
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Transport { .. } | Self::BadServerResponse { .. }
        )
    }
}
