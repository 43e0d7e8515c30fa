//! Schema lookups.

use std::collections::BTreeMap;

use thiserror::Error;

use super::document::{SchemaDocument, PORTAL_SCHEMA_V1, PORTAL_SCHEMA_V2};
use super::{keys, SchemaVersion};

/// Entity type name → (schema key → value).
pub type EntitiesSchemaMap = BTreeMap<String, BTreeMap<String, String>>;

/// Data source property key → value.
pub type DataSourceProperties = BTreeMap<String, String>;

/// Errors looking up schema entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("entity type '{entity}' is not part of schema {version}")]
    UnknownEntity {
        entity: String,
        version: SchemaVersion,
    },
}

fn document(version: SchemaVersion) -> &'static SchemaDocument {
    match version {
        SchemaVersion::V1 => &PORTAL_SCHEMA_V1,
        SchemaVersion::V2 => &PORTAL_SCHEMA_V2,
    }
}

/// Project a schema document into `entity → attributes` maps.
pub fn entities_schema_map(version: SchemaVersion) -> EntitiesSchemaMap {
    document(version)
        .entities
        .iter()
        .filter_map(|entry| {
            let details: BTreeMap<String, String> = entry
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let name = details.get(keys::NAME)?.clone();
            Some((name, details))
        })
        .collect()
}

/// Like [`entities_schema_map`], keyed by schema name. Unknown names yield an empty map.
pub fn entities_schema_map_by_name(name: &str) -> EntitiesSchemaMap {
    name.parse::<SchemaVersion>()
        .map(entities_schema_map)
        .unwrap_or_default()
}

/// Project a schema document's data source properties.
pub fn data_source_properties(version: SchemaVersion) -> DataSourceProperties {
    document(version)
        .data_source
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Like [`data_source_properties`], keyed by schema name. Unknown names yield an empty map.
pub fn data_source_properties_by_name(name: &str) -> DataSourceProperties {
    name.parse::<SchemaVersion>()
        .map(data_source_properties)
        .unwrap_or_default()
}

/// How an entity type's files are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportType {
    /// One subdirectory per record, named after the record.
    SubFolders,
    /// One shared subdirectory for every record of the type.
    SingleFolder,
    /// No extra directory.
    Other(String),
}

impl ExportType {
    pub fn parse(value: &str) -> Self {
        match value {
            "SubFolders" => ExportType::SubFolders,
            "SingleFolder" => ExportType::SingleFolder,
            other => ExportType::Other(other.to_string()),
        }
    }

    /// Whether the type gets a shared type folder.
    pub fn uses_type_folder(&self) -> bool {
        matches!(self, ExportType::SubFolders | ExportType::SingleFolder)
    }
}

/// Typed view of one entity entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: String,
    pub display_name: String,
    pub entity_set: String,
    pub primary_id_field: Option<String>,
    /// Record field naming the files; `None` when the entry declares none.
    pub file_name_field: Option<String>,
    pub folder: String,
    pub export_type: ExportType,
    pub attributes: Vec<String>,
    pub fetch_query: Option<String>,
}

impl EntitySchema {
    /// Build from a raw schema map entry.
    pub fn from_details(name: &str, details: &BTreeMap<String, String>) -> Self {
        let text = |key: &str| details.get(key).cloned().unwrap_or_default();
        let non_empty = |key: &str| details.get(key).filter(|v| !v.is_empty()).cloned();

        let entity_set = non_empty(keys::ENTITY_SET).unwrap_or_else(|| name.to_string());
        let attributes = text(keys::ATTRIBUTES)
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            name: name.to_string(),
            display_name: text(keys::DISPLAY_NAME),
            entity_set,
            primary_id_field: non_empty(keys::PRIMARY_ID_FIELD),
            file_name_field: non_empty(keys::FILE_NAME_FIELD),
            folder: text(keys::FOLDER),
            export_type: ExportType::parse(&text(keys::EXPORT_TYPE)),
            attributes,
            fetch_query: non_empty(keys::FETCH_QUERY),
        }
    }
}

/// Schema lookups for one version.
///
/// The version is fixed for the registry's lifetime, so everything projected
/// through one registry uses one schema.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    version: SchemaVersion,
    entities: EntitiesSchemaMap,
    data_source: DataSourceProperties,
}

impl SchemaRegistry {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            entities: entities_schema_map(version),
            data_source: data_source_properties(version),
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn entities_map(&self) -> &EntitiesSchemaMap {
        &self.entities
    }

    pub fn data_source(&self) -> &DataSourceProperties {
        &self.data_source
    }

    /// Data source property, or an empty string when absent.
    pub fn data_source_value(&self, key: &str) -> &str {
        self.data_source.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Typed entity entry.
    pub fn entity(&self, name: &str) -> Option<EntitySchema> {
        self.entities
            .get(name)
            .map(|details| EntitySchema::from_details(name, details))
    }

    /// Typed entity entry, or an error naming the missing type.
    pub fn require_entity(&self, name: &str) -> Result<EntitySchema, SchemaError> {
        self.entity(name).ok_or_else(|| SchemaError::UnknownEntity {
            entity: name.to_string(),
            version: self.version,
        })
    }
}
