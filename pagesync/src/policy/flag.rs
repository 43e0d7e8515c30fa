//! Cross-geo data movement flag lookup.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::geo::ServiceStamp;
use crate::host::{AuthError, TokenProvider};
use crate::http::{AsyncHttpClient, HttpError};
use crate::telemetry::{EventSink, TelemetryEvent};

/// API version of the admin environment endpoint.
pub const DEFAULT_POLICY_API_VERSION: &str = "2021-04-01";

/// Errors reading the cross-geo flag.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to acquire admin token: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("failed to parse environment policy: {0}")]
    Decode(String),
}

/// Source of the per-environment cross-geo data movement flag.
pub trait CrossGeoFlagSource: Send + Sync {
    /// Read the flag for an environment, scoped by the stamp it lives on.
    fn cross_geo_enabled(
        &self,
        stamp: ServiceStamp,
        environment_id: &str,
    ) -> impl Future<Output = Result<bool, PolicyError>> + Send;
}

#[derive(Debug, Deserialize)]
struct EnvironmentDocument {
    properties: EnvironmentProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentProperties {
    #[serde(default)]
    copilot_policies: Option<CopilotPolicies>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopilotPolicies {
    #[serde(default)]
    cross_geo_copilot_data_movement_enabled: Option<bool>,
}

/// Reads the flag from the admin environment API of the resolved stamp.
pub struct PolicyClient<C: AsyncHttpClient, T: TokenProvider, S: EventSink> {
    http_client: C,
    tokens: T,
    sink: S,
    api_version: String,
}

impl<C: AsyncHttpClient, T: TokenProvider, S: EventSink> PolicyClient<C, T, S> {
    pub fn new(http_client: C, tokens: T, sink: S) -> Self {
        Self {
            http_client,
            tokens,
            sink,
            api_version: DEFAULT_POLICY_API_VERSION.to_string(),
        }
    }

    /// Override the admin API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Builds the environment lookup URL.
    pub fn environment_url(&self, stamp: ServiceStamp, environment_id: &str) -> String {
        format!(
            "{}/providers/Microsoft.BusinessAppPlatform/scopes/admin/environments/{}?$expand=properties&api-version={}",
            stamp.admin_root(),
            environment_id,
            self.api_version
        )
    }

    async fn fetch_flag(&self, stamp: ServiceStamp, environment_id: &str) -> Result<bool, PolicyError> {
        let token = self.tokens.access_token(stamp.admin_root()).await?;
        let url = self.environment_url(stamp, environment_id);
        let body = self.http_client.get(&url, Some(&token)).await?;

        let document: EnvironmentDocument =
            serde_json::from_slice(&body).map_err(|e| PolicyError::Decode(e.to_string()))?;

        Ok(document
            .properties
            .copilot_policies
            .and_then(|p| p.cross_geo_copilot_data_movement_enabled)
            .unwrap_or(false))
    }
}

impl<C: AsyncHttpClient, T: TokenProvider, S: EventSink> CrossGeoFlagSource for PolicyClient<C, T, S> {
    async fn cross_geo_enabled(&self, stamp: ServiceStamp, environment_id: &str) -> Result<bool, PolicyError> {
        let result = self.fetch_flag(stamp, environment_id).await;

        match &result {
            Ok(enabled) => {
                debug!(environment = environment_id, stamp = %stamp, enabled, "Read cross-geo flag");
                self.sink.emit(TelemetryEvent::CrossGeoFlagFetched {
                    environment: environment_id.to_string(),
                    enabled: *enabled,
                });
            }
            Err(e) => {
                warn!(environment = environment_id, stamp = %stamp, error = %e, "Cross-geo flag lookup failed");
                self.sink.emit(TelemetryEvent::CrossGeoFlagFailed {
                    environment: environment_id.to_string(),
                    error: e.to_string(),
                });
            }
        }

        result
    }
}
