//! Entity record fetching.
//!
//! Wraps a single authenticated GET against the Dataverse Web API with API
//! telemetry: a request event before sending and a success or failure event,
//! carrying the elapsed time, once the body is decoded. A body that cannot
//! be decoded counts as a failure. Failures are reported once and never
//! retried.

use std::time::Instant;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::host::{AuthError, TokenProvider};
use crate::http::{AsyncHttpClient, HttpError};
use crate::project::ProjectionError;
use crate::telemetry::{EventSink, TelemetryEvent};

/// Errors fetching entity records.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server or the token provider refused the caller.
    #[error("not authorized to fetch {url}: {reason}")]
    Unauthorized { url: String, reason: String },

    #[error(transparent)]
    Http(HttpError),

    #[error("empty response from {url}")]
    EmptyResponse { url: String },

    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl FetchError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Unauthorized { .. })
    }

    fn from_auth(url: &str, error: AuthError) -> Self {
        FetchError::Unauthorized {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }

    fn from_http(url: &str, error: HttpError) -> Self {
        if error.is_unauthorized() {
            FetchError::Unauthorized {
                url: url.to_string(),
                reason: error.to_string(),
            }
        } else {
            FetchError::Http(error)
        }
    }
}

/// Fetches entity records with a bearer token for the organization.
pub struct EntityFetcher<C: AsyncHttpClient, T: TokenProvider, S: EventSink> {
    http_client: C,
    tokens: T,
    sink: S,
}

impl<C: AsyncHttpClient, T: TokenProvider, S: EventSink> EntityFetcher<C, T, S> {
    pub fn new(http_client: C, tokens: T, sink: S) -> Self {
        Self {
            http_client,
            tokens,
            sink,
        }
    }

    /// GET `url` and decode the JSON body.
    ///
    /// `resource` is the organization URL the token is requested for. An
    /// empty body or a JSON `null` is reported as [`FetchError::EmptyResponse`].
    pub async fn fetch(&self, url: &str, resource: &str) -> Result<Value, FetchError> {
        let token = self
            .tokens
            .access_token(resource)
            .await
            .map_err(|e| FetchError::from_auth(url, e))?;

        self.sink.emit(TelemetryEvent::ApiRequest {
            url: url.to_string(),
        });
        let started = Instant::now();
        let result = self.http_client.get(url, Some(&token)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(body) => {
                debug!(url, elapsed_ms, bytes = body.len(), "Fetched entity");
                decode(url, &body)
            }
            Err(e) => Err(FetchError::from_http(url, e)),
        };

        match &outcome {
            Ok(_) => self.sink.emit(TelemetryEvent::ApiSuccess {
                url: url.to_string(),
                elapsed_ms,
            }),
            Err(e) => {
                warn!(url, elapsed_ms, error = %e, "Entity fetch failed");
                self.sink.emit(TelemetryEvent::ApiFailure {
                    url: url.to_string(),
                    elapsed_ms,
                    error: e.to_string(),
                });
            }
        }
        outcome
    }
}

/// Decode a response body; blank bodies and `null` are empty responses.
fn decode(url: &str, body: &[u8]) -> Result<Value, FetchError> {
    let empty = || FetchError::EmptyResponse {
        url: url.to_string(),
    };

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(empty());
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if value.is_null() {
        return Err(empty());
    }
    Ok(value)
}
