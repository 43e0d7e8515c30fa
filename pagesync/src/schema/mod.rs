//! Versioned portal schema.
//!
//! Two static schema documents describe which entity types exist, which of
//! their attributes become files, where those files go and how requests for
//! them are built. [`SchemaVersion`] selects one document; a
//! [`SchemaRegistry`] projects it into uniform key/value maps and typed
//! [`EntitySchema`] views.
//!
//! # Example
//!
//! ```
//! use pagesync::schema::{ExportType, SchemaRegistry, SchemaVersion};
//!
//! let registry = SchemaRegistry::new(SchemaVersion::V1);
//! let pages = registry.entity("webpages").unwrap();
//! assert_eq!(pages.export_type, ExportType::SubFolders);
//! assert_eq!(pages.folder, "web-pages");
//! ```

mod document;
mod registry;
mod url;
mod version;

pub use registry::{
    data_source_properties, data_source_properties_by_name, entities_schema_map,
    entities_schema_map_by_name, DataSourceProperties, EntitiesSchemaMap, EntitySchema, ExportType,
    SchemaError, SchemaRegistry,
};
pub use url::HttpMethod;
pub use version::{ParseSchemaVersionError, SchemaVersion};

/// Keys of an entity entry in a schema document.
pub mod keys {
    pub const NAME: &str = "_name";
    pub const DISPLAY_NAME: &str = "_displayname";
    pub const ENTITY_SET: &str = "_entitysetname";
    pub const PRIMARY_ID_FIELD: &str = "_primaryidfield";
    /// Record field whose value names the materialized files.
    pub const FILE_NAME_FIELD: &str = "_primarynamefield";
    pub const FOLDER: &str = "_foldername";
    pub const EXPORT_TYPE: &str = "_exporttype";
    pub const ATTRIBUTES: &str = "_attributes";
    pub const FETCH_QUERY: &str = "_fetchQueryParameters";
    pub const PROPERTIES_EXT: &str = "_propertiesext";

    /// Data source property keys.
    pub const API: &str = "api";
    pub const DATA: &str = "data";
    pub const VERSION: &str = "version";
    pub const SCHEMA: &str = "schema";
}
