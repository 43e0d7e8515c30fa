//! Telemetry event model.

use crate::geo::ServiceStamp;

/// A single telemetry event emitted by the sync core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// A cluster discovery probe succeeded for the tenant.
    ClusterResolved {
        tenant: String,
        geo: String,
        stamp: ServiceStamp,
    },

    /// No cluster discovery probe succeeded for the tenant.
    ClusterResolutionFailed { tenant: String },

    /// The cross-geo data movement flag was read.
    CrossGeoFlagFetched { environment: String, enabled: bool },

    /// The cross-geo data movement flag could not be read.
    CrossGeoFlagFailed { environment: String, error: String },

    /// A remote API request is about to be sent.
    ApiRequest { url: String },

    /// A remote API request completed successfully.
    ApiSuccess { url: String, elapsed_ms: u64 },

    /// A remote API request failed.
    ApiFailure {
        url: String,
        elapsed_ms: u64,
        error: String,
    },

    /// A record had no usable value in its file-name field.
    EmptyFileName { entity_type: String },
}

impl TelemetryEvent {
    /// Stable event name used by downstream pipelines.
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::ClusterResolved { .. } => "ClusterResolved",
            TelemetryEvent::ClusterResolutionFailed { .. } => "ClusterResolutionFailed",
            TelemetryEvent::CrossGeoFlagFetched { .. } => "CrossGeoFlagFetched",
            TelemetryEvent::CrossGeoFlagFailed { .. } => "CrossGeoFlagFailed",
            TelemetryEvent::ApiRequest { .. } => "ApiRequest",
            TelemetryEvent::ApiSuccess { .. } => "ApiSuccess",
            TelemetryEvent::ApiFailure { .. } => "ApiFailure",
            TelemetryEvent::EmptyFileName { .. } => "EmptyFileName",
        }
    }

    /// Returns true for events that report a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TelemetryEvent::ClusterResolutionFailed { .. }
                | TelemetryEvent::CrossGeoFlagFailed { .. }
                | TelemetryEvent::ApiFailure { .. }
                | TelemetryEvent::EmptyFileName { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = TelemetryEvent::ClusterResolved {
            tenant: "t".to_string(),
            geo: "us".to_string(),
            stamp: ServiceStamp::Prod,
        };
        assert_eq!(event.name(), "ClusterResolved");
        assert!(!event.is_failure());
    }

    #[test]
    fn test_failure_classification() {
        assert!(TelemetryEvent::ClusterResolutionFailed {
            tenant: "t".to_string()
        }
        .is_failure());
        assert!(TelemetryEvent::ApiFailure {
            url: "u".to_string(),
            elapsed_ms: 3,
            error: "boom".to_string(),
        }
        .is_failure());
        assert!(!TelemetryEvent::ApiRequest {
            url: "u".to_string()
        }
        .is_failure());
    }
}
