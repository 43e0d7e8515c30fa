//! Deployment stamps and their network boundaries.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A named deployment environment with its own network boundary.
///
/// The declaration order is the probe order and the tie-break order for
/// cluster discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceStamp {
    Test,
    Preprod,
    Prod,
    Gcc,
    High,
    Mooncake,
    Dod,
}

/// Error parsing a stamp name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service stamp: {0}")]
pub struct ParseStampError(pub String);

impl ServiceStamp {
    /// All stamps in probe order.
    pub const ALL: [ServiceStamp; 7] = [
        ServiceStamp::Test,
        ServiceStamp::Preprod,
        ServiceStamp::Prod,
        ServiceStamp::Gcc,
        ServiceStamp::High,
        ServiceStamp::Mooncake,
        ServiceStamp::Dod,
    ];

    /// Upper-case stamp name.
    pub fn name(&self) -> &'static str {
        match self {
            ServiceStamp::Test => "TEST",
            ServiceStamp::Preprod => "PREPROD",
            ServiceStamp::Prod => "PROD",
            ServiceStamp::Gcc => "GCC",
            ServiceStamp::High => "HIGH",
            ServiceStamp::Mooncake => "MOONCAKE",
            ServiceStamp::Dod => "DOD",
        }
    }

    /// Number of trailing tenant-id characters used as the routing zone.
    pub fn zone_width(&self) -> usize {
        match self {
            ServiceStamp::Prod => 2,
            _ => 1,
        }
    }

    /// Host suffix following `organization.api.` in gateway URLs.
    pub fn gateway_suffix(&self) -> &'static str {
        match self {
            ServiceStamp::Test => "test.powerplatform.com",
            ServiceStamp::Preprod => "preprod.powerplatform.com",
            ServiceStamp::Prod => "powerplatform.com",
            ServiceStamp::Gcc => "gov.powerplatform.microsoft.us",
            ServiceStamp::High => "high.powerplatform.microsoft.us",
            ServiceStamp::Mooncake => "powerplatform.partner.microsoftonline.cn",
            ServiceStamp::Dod => "appsplatform.us",
        }
    }

    /// Version query parameter of the cluster discovery endpoint.
    ///
    /// Sovereign clouds answer on `app-version`; keep it as is.
    pub fn version_query(&self) -> &'static str {
        match self {
            ServiceStamp::Mooncake | ServiceStamp::Dod => "app-version=1",
            _ => "api-version=1",
        }
    }

    /// Root of the admin (business app platform) API for this stamp.
    pub fn admin_root(&self) -> &'static str {
        match self {
            ServiceStamp::Test => "https://test.api.bap.microsoft.com",
            ServiceStamp::Preprod => "https://preprod.api.bap.microsoft.com",
            ServiceStamp::Prod => "https://api.bap.microsoft.com",
            ServiceStamp::Gcc => "https://gov.api.bap.microsoft.us",
            ServiceStamp::High => "https://high.api.bap.microsoft.us",
            ServiceStamp::Mooncake => "https://api.bap.partner.microsoftonline.cn",
            ServiceStamp::Dod => "https://api.bap.appsplatform.us",
        }
    }
}

impl fmt::Display for ServiceStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceStamp {
    type Err = ParseStampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceStamp::ALL
            .into_iter()
            .find(|stamp| stamp.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStampError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_order() {
        let names: Vec<_> = ServiceStamp::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["TEST", "PREPROD", "PROD", "GCC", "HIGH", "MOONCAKE", "DOD"]
        );
    }

    #[test]
    fn test_only_prod_uses_two_character_zone() {
        for stamp in ServiceStamp::ALL {
            let expected = if stamp == ServiceStamp::Prod { 2 } else { 1 };
            assert_eq!(stamp.zone_width(), expected, "{}", stamp);
        }
    }

    #[test]
    fn test_sovereign_version_query() {
        assert_eq!(ServiceStamp::Mooncake.version_query(), "app-version=1");
        assert_eq!(ServiceStamp::Dod.version_query(), "app-version=1");
        assert_eq!(ServiceStamp::Gcc.version_query(), "api-version=1");
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("prod".parse::<ServiceStamp>().unwrap(), ServiceStamp::Prod);
        assert_eq!("MoonCake".parse::<ServiceStamp>().unwrap(), ServiceStamp::Mooncake);
        assert!("staging".parse::<ServiceStamp>().is_err());
    }
}
