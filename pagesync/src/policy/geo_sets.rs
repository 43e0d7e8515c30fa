//! Supported and disabled geo sets.

use std::collections::BTreeSet;

/// Geos where the intelligence service is deployed.
pub const DEFAULT_SUPPORTED_GEOS: &[&str] = &["us", "wus", "eu", "uk", "jp", "in", "au", "ca", "apj"];

/// Geos where the intelligence service must never be called.
pub const DEFAULT_DISABLED_GEOS: &[&str] = &["gov", "high", "dod", "mooncake"];

/// The two geo sets consulted by the cross-geo evaluator.
///
/// Geo names are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoPolicy {
    supported: BTreeSet<String>,
    disabled: BTreeSet<String>,
}

impl Default for GeoPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_SUPPORTED_GEOS.iter().copied(),
            DEFAULT_DISABLED_GEOS.iter().copied(),
        )
    }
}

impl GeoPolicy {
    /// Build a policy from explicit geo lists.
    pub fn new<I, J, A, B>(supported: I, disabled: J) -> Self
    where
        I: IntoIterator<Item = A>,
        J: IntoIterator<Item = B>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        Self {
            supported: normalize(supported),
            disabled: normalize(disabled),
        }
    }

    pub fn is_supported(&self, geo: &str) -> bool {
        self.supported.contains(&geo.trim().to_ascii_lowercase())
    }

    pub fn is_disabled(&self, geo: &str) -> bool {
        self.disabled.contains(&geo.trim().to_ascii_lowercase())
    }

    /// Supported geos, sorted.
    pub fn supported(&self) -> impl Iterator<Item = &str> {
        self.supported.iter().map(String::as_str)
    }

    /// Disabled geos, sorted.
    pub fn disabled(&self) -> impl Iterator<Item = &str> {
        self.disabled.iter().map(String::as_str)
    }
}

fn normalize<I, A>(geos: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = A>,
    A: AsRef<str>,
{
    geos.into_iter()
        .map(|g| g.as_ref().trim().to_ascii_lowercase())
        .filter(|g| !g.is_empty())
        .collect()
}
