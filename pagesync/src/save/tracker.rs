use serde_json::{json, Map, Value};
use tracing::debug;

use super::{SaveEntityDetails, SaveError, SaveMap, SaveRequest};
use crate::schema::{HttpMethod, SchemaRegistry, SchemaVersion};
use crate::vfs::VirtualPath;

/// Path → remote coordinates map, filled by projection.
///
/// Recording a path that is already present replaces its entry. Nothing is
/// ever removed; a host that wants to forget a file does so on its exported
/// copy. Besides re-projection, only [`SaveTracker::commit`] changes an
/// entry, and only its stored content.
#[derive(Debug, Default, Clone)]
pub struct SaveTracker {
    entries: SaveMap,
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `path`.
    pub fn record(&mut self, path: VirtualPath, details: SaveEntityDetails) {
        debug!(path = %path, entity = %details.entity_type, attribute = %details.attribute, "Tracking file");
        self.entries.insert(path, details);
    }

    pub fn get(&self, path: &VirtualPath) -> Option<&SaveEntityDetails> {
        self.entries.get(path)
    }

    /// Snapshot handed to the save provider.
    pub fn export(&self) -> SaveMap {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the PATCH that writes `text` back to the field behind `path`.
    pub fn save_request(
        &self,
        path: &VirtualPath,
        text: &str,
        org_url: &str,
    ) -> Result<SaveRequest, SaveError> {
        let details = self
            .get(path)
            .ok_or_else(|| SaveError::NotTracked(path.clone()))?;

        let registry = SchemaRegistry::new(details.schema_version);
        let url = registry.request_url(
            org_url,
            &details.entity_type,
            &details.entity_id,
            HttpMethod::Patch,
        )?;

        let body = match details.schema_version {
            SchemaVersion::V1 => {
                let mut body = Map::new();
                body.insert(details.attribute.clone(), Value::String(text.to_string()));
                Value::Object(body)
            }
            SchemaVersion::V2 => {
                let content = merged_content(path, details, text)?;
                json!({ "content": content })
            }
        };

        Ok(SaveRequest { url, body })
    }

    /// Record that `text` was saved to the field behind `path`.
    ///
    /// Component records share one `content` document across their files, so
    /// every entry of the same record picks up the new value and a later save
    /// of a sibling file keeps it. Returns the number of entries updated.
    pub fn commit(&mut self, path: &VirtualPath, text: &str) -> Result<usize, SaveError> {
        let details = self
            .get(path)
            .ok_or_else(|| SaveError::NotTracked(path.clone()))?
            .clone();

        let updated = match details.schema_version {
            SchemaVersion::V1 => {
                if let Some(entry) = self.entries.get_mut(path) {
                    entry.content = text.to_string();
                }
                1
            }
            SchemaVersion::V2 => {
                let content = merged_content(path, &details, text)?;
                let mut updated = 0;
                for entry in self.entries.values_mut().filter(|entry| {
                    entry.entity_id == details.entity_id && entry.entity_type == details.entity_type
                }) {
                    entry.content = content.clone();
                    updated += 1;
                }
                updated
            }
        };

        debug!(path = %path, entity = %details.entity_type, updated, "Committed save");
        Ok(updated)
    }
}

/// The stored `content` document with `details.attribute` set to `text`.
fn merged_content(path: &VirtualPath, details: &SaveEntityDetails, text: &str) -> Result<String, SaveError> {
    let mut content: Map<String, Value> =
        serde_json::from_str(&details.content).map_err(|e| SaveError::InvalidContent {
            path: path.clone(),
            reason: e.to_string(),
        })?;
    content.insert(details.attribute.clone(), Value::String(text.to_string()));
    Ok(Value::Object(content).to_string())
}
