//! Tenant identifiers.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::ServiceStamp;

/// Error parsing a tenant id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantIdError {
    #[error("tenant id is empty")]
    Empty,

    #[error("tenant id must be 32 hex characters (hyphens allowed): {0}")]
    InvalidFormat(String),
}

/// Tenant (organization) identifier.
///
/// Keeps the caller's spelling for display and a hyphen-free form for host
/// name construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId {
    raw: String,
    compact: String,
}

/// Pattern for a de-hyphenated tenant id: exactly 32 hex digits.
fn compact_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9A-Fa-f]{32}$").expect("tenant id pattern is valid"))
}

impl TenantId {
    /// Parse a tenant id, accepting hyphens anywhere.
    ///
    /// ```
    /// use pagesync::geo::TenantId;
    ///
    /// let id = TenantId::parse("c7809087-d9b8-4a00-a78a-a4b901caa23f").unwrap();
    /// assert_eq!(id.compact(), "c7809087d9b84a00a78aa4b901caa23f");
    /// ```
    pub fn parse(input: &str) -> Result<Self, TenantIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TenantIdError::Empty);
        }

        let compact: String = trimmed.chars().filter(|c| *c != '-').collect();
        if !compact_pattern().is_match(&compact) {
            return Err(TenantIdError::InvalidFormat(trimmed.to_string()));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            compact,
        })
    }

    /// The id as supplied by the caller.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The id with all hyphens removed.
    pub fn compact(&self) -> &str {
        &self.compact
    }

    /// Split the compact id into `(domain, zone)` host segments for a stamp.
    pub fn host_segments(&self, stamp: ServiceStamp) -> (&str, &str) {
        let split = self.compact.len() - stamp.zone_width();
        self.compact.split_at(split)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_removes_hyphens() {
        let id = TenantId::parse("c7809087-d9b8-4a00-a78a-a4b901caa23f").unwrap();
        assert_eq!(id.as_str(), "c7809087-d9b8-4a00-a78a-a4b901caa23f");
        assert_eq!(id.compact(), "c7809087d9b84a00a78aa4b901caa23f");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(TenantId::parse("  "), Err(TenantIdError::Empty));
        assert!(matches!(
            TenantId::parse("not-a-tenant"),
            Err(TenantIdError::InvalidFormat(_))
        ));
        assert!(TenantId::parse("c7809087d9b84a00a78aa4b901caa23").is_err());
        assert!(TenantId::parse("g7809087d9b84a00a78aa4b901caa23f").is_err());
    }

    #[test]
    fn test_host_segments() {
        let id = TenantId::parse("c7809087-d9b8-4a00-a78a-a4b901caa23f").unwrap();
        assert_eq!(
            id.host_segments(ServiceStamp::Test),
            ("c7809087d9b84a00a78aa4b901caa23", "f")
        );
        assert_eq!(
            id.host_segments(ServiceStamp::Prod),
            ("c7809087d9b84a00a78aa4b901caa2", "3f")
        );
    }
}
