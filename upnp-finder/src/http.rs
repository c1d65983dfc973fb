//! HTTP capability used to fetch description documents.
//!
//! The resolver only needs `GET(url) -> {status, body}`. Keeping that behind
//! a trait lets the finder run against canned responses in tests and lets
//! applications share their own HTTP client.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FinderError, Result};

/// Status and body of a fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
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

    /// `true` for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Asynchronous `GET` used by the resolver.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status, and `Err` only when no response could be obtained.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Default fetcher backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Reuse an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FinderError::Fetch {
                location: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| FinderError::Fetch {
            location: url.to_string(),
            reason: format!("failed to read response body: {}", e),
        })?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[tokio::test]
    async fn test_reqwest_fetcher_returns_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/desc.xml")
            .with_status(200)
            .with_body("<root/>")
            .create_async()
            .await;

        let fetcher = ReqwestFetcher::new(Duration::from_secs(2)).unwrap();
        let response = fetcher
            .get(&format!("{}/desc.xml", server.url()))
            .await
            .unwrap();

        assert_eq!(response, HttpResponse::new(200, "<root/>"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reqwest_fetcher_passes_error_status_through() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.xml")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = ReqwestFetcher::new(Duration::from_secs(2)).unwrap();
        let response = fetcher
            .get(&format!("{}/missing.xml", server.url()))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_reqwest_fetcher_invalid_url() {
        let fetcher = ReqwestFetcher::new(Duration::from_secs(2)).unwrap();
        let result = fetcher.get("TEST_URL").await;
        assert!(matches!(result, Err(FinderError::Fetch { .. })));
    }
}
