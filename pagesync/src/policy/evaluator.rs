//! Cross-geo gate and intelligence endpoint construction.

use tracing::{info, warn};

use super::{CrossGeoFlagSource, GeoPolicy};
use crate::geo::{GeoResolution, TenantId};

/// Outcome of endpoint resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The endpoint may be called at this URL.
    Available(String),
    /// Policy forbids calling the service for this tenant.
    Unavailable,
    /// The tenant's cluster could not be discovered.
    NotResolved,
}

impl Endpoint {
    /// The URL, when the endpoint is available.
    pub fn url(&self) -> Option<&str> {
        match self {
            Endpoint::Available(url) => Some(url),
            _ => None,
        }
    }
}

/// Result of the geo checks, before any URL is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allowed,
    /// Geo is in the disabled set.
    Disabled,
    /// Geo is outside the supported set and cross-geo movement is off.
    Unsupported,
}

/// Endpoint plus the facts that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntelligenceEndpoint {
    pub endpoint: Endpoint,
    pub geo_name: Option<String>,
    pub cross_geo_enabled: bool,
}

impl IntelligenceEndpoint {
    /// Result for a tenant whose cluster could not be discovered.
    pub fn not_resolved() -> Self {
        Self {
            endpoint: Endpoint::NotResolved,
            geo_name: None,
            cross_geo_enabled: false,
        }
    }
}

/// URL template of the regional intelligence service.
///
/// `https://{service}.{geo}-il{cluster}.gateway.{environment}.island.{platform_domain}/v1.0/{tenant}/{api_path}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    pub service: String,
    pub platform_domain: String,
    pub api_path: String,
}

impl Default for EndpointTemplate {
    fn default() -> Self {
        Self {
            service: "aibuildertextapiservice".to_string(),
            platform_domain: "powerapps.com".to_string(),
            api_path: "appintelligence/chat".to_string(),
        }
    }
}

impl EndpointTemplate {
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_platform_domain(mut self, domain: impl Into<String>) -> Self {
        self.platform_domain = domain.into();
        self
    }

    pub fn with_api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = path.into();
        self
    }

    /// Render the URL for a resolved cluster.
    pub fn render(&self, resolution: &GeoResolution, tenant: &TenantId) -> String {
        format!(
            "https://{}.{}-il{}.gateway.{}.island.{}/v1.0/{}/{}",
            self.service,
            resolution.geo_name,
            resolution.cluster_number,
            resolution.environment,
            self.platform_domain,
            tenant.as_str(),
            self.api_path.trim_start_matches('/')
        )
    }
}

/// Applies the cross-geo policy to a resolved cluster.
pub struct CrossGeoEvaluator<F: CrossGeoFlagSource> {
    flags: F,
    geos: GeoPolicy,
    template: EndpointTemplate,
}

impl<F: CrossGeoFlagSource> CrossGeoEvaluator<F> {
    pub fn new(flags: F) -> Self {
        Self {
            flags,
            geos: GeoPolicy::default(),
            template: EndpointTemplate::default(),
        }
    }

    pub fn with_geo_policy(mut self, geos: GeoPolicy) -> Self {
        self.geos = geos;
        self
    }

    pub fn with_template(mut self, template: EndpointTemplate) -> Self {
        self.template = template;
        self
    }

    /// Geo checks only. The disabled set always wins over the flag.
    pub fn gate(&self, geo_name: &str, cross_geo_enabled: bool) -> Gate {
        if self.geos.is_disabled(geo_name) {
            Gate::Disabled
        } else if cross_geo_enabled || self.geos.is_supported(geo_name) {
            Gate::Allowed
        } else {
            Gate::Unsupported
        }
    }

    /// Evaluate the policy for a resolved tenant.
    ///
    /// A flag lookup failure reads as `false`.
    pub async fn evaluate(
        &self,
        resolution: &GeoResolution,
        tenant: &TenantId,
        environment_id: &str,
    ) -> IntelligenceEndpoint {
        let cross_geo_enabled = match self
            .flags
            .cross_geo_enabled(resolution.stamp, environment_id)
            .await
        {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!(environment = environment_id, error = %e, "Treating cross-geo flag as disabled");
                false
            }
        };

        let endpoint = match self.gate(&resolution.geo_name, cross_geo_enabled) {
            Gate::Allowed => Endpoint::Available(self.template.render(resolution, tenant)),
            gate => {
                info!(geo = %resolution.geo_name, ?gate, "Intelligence endpoint unavailable");
                Endpoint::Unavailable
            }
        };

        IntelligenceEndpoint {
            endpoint,
            geo_name: Some(resolution.geo_name.clone()),
            cross_geo_enabled,
        }
    }
}
