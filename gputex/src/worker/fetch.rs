//! Fetching container bytes.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

/// Errors from fetching a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("Fetch failed: {status}, {reason}")]
    Status { status: u16, reason: String },

    /// The request never produced a response (connect, timeout, body read).
    #[error("Fetch failed: {0}")]
    Request(String),
}

impl FetchError {
    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Request(_) => None,
        }
    }
}

/// Boxed future returned by [`Fetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, FetchError>> + Send + 'a>>;

/// Source of container bytes addressed by URL.
///
/// This abstraction allows the worker to be tested without a network.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

/// Fetcher backed by reqwest.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("").to_string(),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| FetchError::Request(format!("Failed to read response: {}", e)))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fetcher serving canned responses by URL.
    #[derive(Default)]
    pub struct MockFetcher {
        pub responses: HashMap<String, Result<Bytes, FetchError>>,
    }

    impl MockFetcher {
        pub fn with(mut self, url: &str, response: Result<Bytes, FetchError>) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
            Box::pin(async move {
                self.responses.get(url).cloned().unwrap_or(Err(FetchError::Status {
                    status: 404,
                    reason: "Not Found".to_string(),
                }))
            })
        }
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Fetch failed: 404, Not Found");
        assert_eq!(err.status(), Some(404));

        let err = FetchError::Request("timed out".to_string());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_mock_fetcher_unknown_url_is_404() {
        let fetcher = MockFetcher::default();
        let err = fetcher.fetch("https://example.com/missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_reqwest_fetcher_builds() {
        assert!(ReqwestFetcher::new(Duration::from_secs(5)).is_ok());
    }
}
