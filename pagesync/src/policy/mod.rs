//! Cross-geo data residency policy.
//!
//! Given a resolved cluster, decides whether the intelligence endpoint may be
//! called and builds its URL when it may.
//!
//! # Decision Order
//!
//! 1. Read the tenant environment's cross-geo flag (failures read as `false`)
//! 2. Geo in the disabled set → unavailable, whatever the flag says
//! 3. Flag set → allowed, even for geos outside the supported set
//! 4. Geo outside the supported set → unavailable
//! 5. Otherwise → allowed
//!
//! The flag overrides the supported set only. It never overrides the disabled
//! set.

mod evaluator;
mod flag;
mod geo_sets;

pub use evaluator::{CrossGeoEvaluator, Endpoint, EndpointTemplate, Gate, IntelligenceEndpoint};
pub use flag::{CrossGeoFlagSource, PolicyClient, PolicyError, DEFAULT_POLICY_API_VERSION};
pub use geo_sets::{GeoPolicy, DEFAULT_DISABLED_GEOS, DEFAULT_SUPPORTED_GEOS};
