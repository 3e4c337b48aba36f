//! Port for the raw HTTP transport.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::domain::errors::FetchError;

/// A plain GET request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Target URL.
    pub url: Url,
    /// `Authorization` header, when the endpoint needs one.
    pub authorization: Option<String>,
}

impl HttpRequest {
    /// Creates an unauthenticated GET.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self {
            url,
            authorization: None,
        }
    }

    /// Attaches an `Authorization` header.
    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

/// Response head and fully read body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Port executing one HTTP exchange. Retry and timeout policy live above it.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and reads the whole body.
    ///
    /// # Errors
    /// Returns `FetchError::Transport` (or `Timeout`) when no response arrives.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}
