//! HTTP transport seam.
//!
//! [`DataClient`](super::DataClient) only needs "GET this URL, give me the
//! status and the body". Keeping that behind a trait lets tests count and
//! script network calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::errors::MarketDataError;

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a GET request.
    ///
    /// Returns `Ok` for every response that arrived, whatever its status;
    /// `Err` only when no response was received.
    async fn get(&self, url: &Url) -> Result<HttpResponse, MarketDataError>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, MarketDataError> {
        // reqwest errors carry the request URL, query credential included.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.without_url()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Network(e.without_url()))?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        assert!(HttpResponse::new(200, "{}").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(429, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
