//! Concurrent cluster discovery with first-success selection.

use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use super::{candidate_urls, EndpointCandidate, ServiceStamp, TenantId};
use crate::http::AsyncHttpClient;
use crate::telemetry::{EventSink, TelemetryEvent};

/// Default per-probe timeout in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Body returned by a cluster discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandInfo {
    pub geo_name: String,
    pub environment: String,
    #[serde(deserialize_with = "string_or_number")]
    pub cluster_number: String,
}

/// Cluster numbers arrive either as `"104"` or as `104`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// The authoritative cluster for a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoResolution {
    pub geo_name: String,
    pub environment: String,
    pub cluster_number: String,
    /// Stamp whose probe produced this resolution.
    pub stamp: ServiceStamp,
}

impl GeoResolution {
    fn from_island(info: IslandInfo, stamp: ServiceStamp) -> Self {
        Self {
            geo_name: info.geo_name,
            environment: info.environment,
            cluster_number: info.cluster_number,
            stamp,
        }
    }
}

/// Configuration for cluster discovery.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound for a single probe. A probe that exceeds it counts as failed.
    pub probe_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl ResolverConfig {
    /// Set the per-probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// Resolves the regional cluster serving a tenant.
///
/// All candidates are probed concurrently and every probe is allowed to
/// settle (or time out) before a winner is picked, so the outcome depends only
/// on which probes succeeded, never on which finished first.
pub struct GeoResolver<C: AsyncHttpClient, S: EventSink> {
    http_client: C,
    sink: S,
    config: ResolverConfig,
}

impl<C: AsyncHttpClient, S: EventSink> GeoResolver<C, S> {
    /// Creates a resolver with default configuration.
    pub fn new(http_client: C, sink: S) -> Self {
        Self::with_config(http_client, sink, ResolverConfig::default())
    }

    /// Creates a resolver with custom configuration.
    pub fn with_config(http_client: C, sink: S, config: ResolverConfig) -> Self {
        Self {
            http_client,
            sink,
            config,
        }
    }

    /// Resolve the tenant's cluster.
    ///
    /// Returns `None` when no candidate answered with a valid body. Emits
    /// exactly one success or failure telemetry event.
    pub async fn resolve(&self, tenant: &TenantId) -> Option<GeoResolution> {
        let candidates = candidate_urls(tenant);
        let outcomes = self.probe_all(&candidates).await;

        let succeeded = outcomes.iter().filter(|o| o.is_some()).count();
        let resolution = outcomes.into_iter().flatten().next();

        match &resolution {
            Some(found) => {
                info!(
                    tenant = %tenant,
                    geo = %found.geo_name,
                    stamp = %found.stamp,
                    succeeded,
                    "Resolved tenant cluster"
                );
                self.sink.emit(TelemetryEvent::ClusterResolved {
                    tenant: tenant.to_string(),
                    geo: found.geo_name.clone(),
                    stamp: found.stamp,
                });
            }
            None => {
                warn!(tenant = %tenant, "No cluster discovery probe succeeded");
                self.sink.emit(TelemetryEvent::ClusterResolutionFailed {
                    tenant: tenant.to_string(),
                });
            }
        }

        resolution
    }

    /// Probe every candidate concurrently.
    ///
    /// The result has one slot per candidate, in candidate order.
    pub async fn probe_all(&self, candidates: &[EndpointCandidate]) -> Vec<Option<GeoResolution>> {
        join_all(candidates.iter().map(|candidate| self.probe(candidate))).await
    }

    async fn probe(&self, candidate: &EndpointCandidate) -> Option<GeoResolution> {
        let request = self.http_client.get(&candidate.url, None);
        let body = match tokio::time::timeout(self.config.probe_timeout, request).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                debug!(stamp = %candidate.stamp, error = %e, "Probe failed");
                return None;
            }
            Err(_) => {
                debug!(
                    stamp = %candidate.stamp,
                    timeout_ms = self.config.probe_timeout.as_millis() as u64,
                    "Probe timed out"
                );
                return None;
            }
        };

        match serde_json::from_slice::<IslandInfo>(&body) {
            Ok(info) => Some(GeoResolution::from_island(info, candidate.stamp)),
            Err(e) => {
                debug!(stamp = %candidate.stamp, error = %e, "Probe returned malformed body");
                None
            }
        }
    }
}
