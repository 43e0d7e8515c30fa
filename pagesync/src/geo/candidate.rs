//! Candidate gateway URLs derived from a tenant id.

use super::{ServiceStamp, TenantId};

/// One cluster discovery URL for one stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub stamp: ServiceStamp,
    pub url: String,
}

impl EndpointCandidate {
    /// Builds the discovery URL for the tenant on the given stamp.
    pub fn new(tenant: &TenantId, stamp: ServiceStamp) -> Self {
        let (domain, zone) = tenant.host_segments(stamp);
        let url = format!(
            "https://{}.{}.organization.api.{}/gateway/cluster?{}",
            domain,
            zone,
            stamp.gateway_suffix(),
            stamp.version_query()
        );
        Self { stamp, url }
    }
}

/// Derive one candidate per stamp, in probe order.
pub fn candidate_urls(tenant: &TenantId) -> [EndpointCandidate; 7] {
    ServiceStamp::ALL.map(|stamp| EndpointCandidate::new(tenant, stamp))
}
