//! Schema version tags.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Portal data model version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Per-type tables (`adx_webpages`, `adx_webtemplates`, ...), list responses.
    V1,
    /// Single component table with JSON content, single-record responses.
    V2,
}

/// Error parsing a schema version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown schema version: {0}")]
pub struct ParseSchemaVersionError(pub String);

impl SchemaVersion {
    /// Name used in query parameters and data source properties.
    pub fn schema_name(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "portalschemav1",
            SchemaVersion::V2 => "portalschemav2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "V1",
            SchemaVersion::V2 => "V2",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SchemaVersion {
    type Err = ParseSchemaVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "v1" | "portalschemav1" => Ok(SchemaVersion::V1),
            "v2" | "portalschemav2" => Ok(SchemaVersion::V2),
            _ => Err(ParseSchemaVersionError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_and_names() {
        assert_eq!("V1".parse::<SchemaVersion>().unwrap(), SchemaVersion::V1);
        assert_eq!("portalschemav2".parse::<SchemaVersion>().unwrap(), SchemaVersion::V2);
        assert_eq!("PortalSchemaV1".parse::<SchemaVersion>().unwrap(), SchemaVersion::V1);
        assert!("v3".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(SchemaVersion::V2.to_string(), "V2");
        assert_eq!(SchemaVersion::V1.schema_name(), "portalschemav1");
    }
}
