//! HTTP client abstraction for testability
//!
//! Every remote call in the crate (cluster probes, policy lookups, entity
//! fetches) goes through [`AsyncHttpClient`], so tests can script responses
//! per URL instead of touching the network.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors produced by the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// Connection, DNS or TLS failure.
    #[error("request failed: {0}")]
    Network(String),

    /// The server rejected our credentials (401 or 403).
    #[error("unauthorized (HTTP {code}) from {url}")]
    Unauthorized { code: u16, url: String },

    /// Any other non-2xx response.
    #[error("HTTP {code} from {url}")]
    Status { code: u16, url: String },

    /// The request did not finish in time.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The response body could not be read.
    #[error("failed to read response: {0}")]
    Body(String),
}

impl HttpError {
    /// Returns true when the failure should prompt re-authentication.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HttpError::Unauthorized { .. })
    }

    /// Classify a non-success status code.
    pub fn from_status(code: u16, url: &str) -> Self {
        match code {
            401 | 403 => HttpError::Unauthorized {
                code,
                url: url.to_string(),
            },
            _ => HttpError::Status {
                code,
                url: url.to_string(),
            },
        }
    }
}

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `bearer` - Optional access token sent as `Authorization: Bearer`
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures and
    /// non-2xx statuses.
    fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

impl<C: AsyncHttpClient> AsyncHttpClient for Arc<C> {
    fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send {
        (**self).get(url, bearer)
    }
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>, HttpError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout {
                    url: url.to_string(),
                }
            } else {
                HttpError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::from_status(status.as_u16(), url));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| HttpError::Body(e.to_string()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use parking_lot::Mutex;

    /// A request observed by [`MockHttpClient`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MockRequest {
        pub url: String,
        pub bearer: Option<String>,
    }

    /// Mock HTTP client scripted per URL.
    ///
    /// Unscripted URLs fail with a network error. Hanging URLs never complete.
    #[derive(Default)]
    pub struct MockHttpClient {
        responses: HashMap<String, Result<Vec<u8>, HttpError>>,
        hanging: HashSet<String>,
        requests: Mutex<Vec<MockRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
            self.responses.insert(url.into(), Ok(body.into()));
            self
        }

        pub fn with_error(mut self, url: impl Into<String>, error: HttpError) -> Self {
            self.responses.insert(url.into(), Err(error));
            self
        }

        pub fn with_hanging(mut self, url: impl Into<String>) -> Self {
            self.hanging.insert(url.into());
            self
        }

        pub fn requests(&self) -> Vec<MockRequest> {
            self.requests.lock().clone()
        }
    }

    impl AsyncHttpClient for MockHttpClient {
        async fn get(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>, HttpError> {
            self.requests.lock().push(MockRequest {
                url: url.to_string(),
                bearer: bearer.map(str::to_string),
            });

            if self.hanging.contains(url) {
                std::future::pending::<()>().await;
            }

            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(HttpError::Network(format!("no route to {}", url))))
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::new().with_response("http://example.com", vec![1, 2, 3, 4]);

        let result = mock.get("http://example.com", None).await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_mock_client_unscripted_url_fails() {
        let mock = MockHttpClient::new();

        let result = mock.get("http://example.com", None).await;
        assert!(matches!(result, Err(HttpError::Network(_))));
    }

    #[tokio::test]
    async fn test_mock_client_records_bearer() {
        let mock = MockHttpClient::new().with_response("http://example.com", "{}");

        mock.get("http://example.com", Some("token")).await.unwrap();
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].bearer.as_deref(), Some("token"));
    }

    #[test]
    fn test_status_classification() {
        assert!(HttpError::from_status(401, "u").is_unauthorized());
        assert!(HttpError::from_status(403, "u").is_unauthorized());
        assert!(!HttpError::from_status(500, "u").is_unauthorized());
        assert_eq!(
            HttpError::from_status(404, "http://x").to_string(),
            "HTTP 404 from http://x"
        );
    }

    #[tokio::test]
    async fn test_arc_client_delegates() {
        let mock = Arc::new(MockHttpClient::new().with_response("http://example.com", "ok"));

        let body = AsyncHttpClient::get(&mock, "http://example.com", None)
            .await
            .unwrap();
        assert_eq!(body, b"ok");
        assert_eq!(mock.requests().len(), 1);
    }
}
