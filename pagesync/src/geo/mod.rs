//! Cluster discovery for multi-geo tenants.
//!
//! A tenant lives in exactly one regional cluster, but nothing in its id says
//! which sovereign cloud hosts it. Discovery derives one gateway URL per
//! [`ServiceStamp`] from the tenant id, probes all of them at once and keeps
//! the first success in stamp order.
//!
//! # URL Pattern
//!
//! `https://{domain}.{zone}.organization.api.{suffix}/gateway/cluster?api-version=1`
//!
//! - The prod stamp splits the last two hex characters off as the zone
//! - Every other stamp splits off only the last character
//! - Mooncake and DoD use `app-version=1` instead of `api-version=1`
//!
//! # Example
//!
//! ```
//! use pagesync::geo::{candidate_urls, ServiceStamp, TenantId};
//!
//! let tenant = TenantId::parse("c7809087-d9b8-4a00-a78a-a4b901caa23f").unwrap();
//! let candidates = candidate_urls(&tenant);
//! assert_eq!(candidates[2].stamp, ServiceStamp::Prod);
//! assert_eq!(
//!     candidates[2].url,
//!     "https://c7809087d9b84a00a78aa4b901caa2.3f.organization.api.powerplatform.com/gateway/cluster?api-version=1"
//! );
//! ```

mod candidate;
mod resolver;
mod stamp;
mod tenant;

pub use candidate::{candidate_urls, EndpointCandidate};
pub use resolver::{GeoResolution, GeoResolver, IslandInfo, ResolverConfig, DEFAULT_PROBE_TIMEOUT_SECS};
pub use stamp::{ParseStampError, ServiceStamp};
pub use tenant::{TenantId, TenantIdError};
