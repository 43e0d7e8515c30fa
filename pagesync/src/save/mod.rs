//! Save-back tracking.
//!
//! Every file the projector writes is recorded here against the remote
//! coordinates it came from: record id, entity type, attribute and schema
//! version. After a projection pass the map is exported to the host's save
//! provider, which uses [`SaveTracker::save_request`] to push an edited file
//! back to the right field.

mod tracker;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::schema::{SchemaError, SchemaVersion};
use crate::vfs::VirtualPath;

pub use tracker::SaveTracker;

/// Path → remote coordinates.
pub type SaveMap = BTreeMap<VirtualPath, SaveEntityDetails>;

/// Portal site a projection pass runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    /// Dataverse organization URL, e.g. `https://contoso.crm.dynamics.com`.
    pub org_url: String,
    /// Top-level folder name for the site.
    pub website_name: String,
    pub website_id: String,
}

impl SiteContext {
    pub fn new(
        org_url: impl Into<String>,
        website_name: impl Into<String>,
        website_id: impl Into<String>,
    ) -> Self {
        Self {
            org_url: org_url.into(),
            website_name: website_name.into(),
            website_id: website_id.into(),
        }
    }
}

/// Remote coordinates of one materialized file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEntityDetails {
    pub entity_id: String,
    /// Schema entity type the record belongs to.
    pub entity_type: String,
    pub attribute: String,
    #[serde(serialize_with = "serialize_version")]
    pub schema_version: SchemaVersion,
    /// Raw `content` text for component records, otherwise the file body.
    pub content: String,
}

fn serialize_version<S: serde::Serializer>(version: &SchemaVersion, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(version.label())
}

/// A prepared PATCH for one edited file.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub url: String,
    pub body: serde_json::Value,
}

/// Errors building a save request.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no remote record is tracked for {0}")]
    NotTracked(VirtualPath),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("stored content for {path} is not a JSON object: {reason}")]
    InvalidContent { path: VirtualPath, reason: String },
}
