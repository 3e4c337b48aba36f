//! reqwest-backed HTTP transport.

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::{trace, warn};

use crate::domain::errors::FetchError;
use crate::domain::ports::{HttpRequest, HttpResponse, HttpTransport};

const USER_AGENT: &str = concat!("unsplash-feed/", env!("CARGO_PKG_VERSION"));

/// Transport executing requests with a shared reqwest client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a pooled client.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = self.client.get(request.url.clone());
        if let Some(auth) = &request.authorization {
            builder = builder
                .header(header::AUTHORIZATION, auth)
                .header("Accept-Version", "v1");
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "Request failed");
            if e.is_timeout() {
                FetchError::transport("request timed out")
            } else if e.is_connect() {
                FetchError::transport(format!("failed to connect: {e}"))
            } else if e.is_builder() {
                FetchError::bad_url(request.url.as_str())
            } else {
                FetchError::transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(format!("failed to read body: {e}")))?;

        trace!(url = %request.url, status, size = body.len(), "Response received");

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
