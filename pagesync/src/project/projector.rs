//! Record → file projection.
//!
//! Each attribute of an entity type becomes one file under
//! `/{site}/{folder}[/{record}]`. The body comes from the record's `content`
//! document when it has one, keyed by attribute, and from the record's own
//! column otherwise. A missing value writes an empty file.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::language::LanguageMap;
use super::naming::{file_extension, file_name_with_extension, normalize_file_name};
use super::{ProjectionError, ProjectionFailure, ProjectionReport, COMPONENT_ENTITY, COMPONENT_NAMING_ENTITY, NO_CONTENT};
use crate::save::{SaveEntityDetails, SaveTracker, SiteContext};
use crate::schema::{ExportType, SchemaRegistry, SchemaVersion};
use crate::vfs::{VirtualFs, VirtualPath, WriteOptions};

/// Field holding a component record's JSON-encoded attributes.
const CONTENT_FIELD: &str = "content";

/// Materializes fetched records as files.
///
/// A projector is bound to one schema registry, so a projection pass never
/// mixes schema versions. Every file it writes is recorded in the caller's
/// [`SaveTracker`].
pub struct Projector<'a, F: VirtualFs + ?Sized> {
    fs: &'a F,
    registry: &'a SchemaRegistry,
    languages: &'a LanguageMap,
    site: &'a SiteContext,
}

impl<'a, F: VirtualFs + ?Sized> Projector<'a, F> {
    pub fn new(
        fs: &'a F,
        registry: &'a SchemaRegistry,
        languages: &'a LanguageMap,
        site: &'a SiteContext,
    ) -> Self {
        Self {
            fs,
            registry,
            languages,
            site,
        }
    }

    /// Project a fetch response.
    ///
    /// V2 responses are a single component record. V1 responses carry a
    /// `value` list whose entries are projected independently; a failing
    /// entry is reported and its siblings still run.
    pub fn project_response(
        &self,
        entity: &str,
        response: &Value,
        requested_id: &str,
        tracker: &mut SaveTracker,
    ) -> ProjectionReport {
        let mut report = ProjectionReport::default();

        let records: Vec<&Value> = match self.registry.version() {
            SchemaVersion::V2 if response.is_null() => Vec::new(),
            SchemaVersion::V2 => vec![response],
            SchemaVersion::V1 => response
                .get("value")
                .and_then(Value::as_array)
                .map(|list| list.iter().collect())
                .unwrap_or_default(),
        };
        let entity = match self.registry.version() {
            SchemaVersion::V2 => COMPONENT_ENTITY,
            SchemaVersion::V1 => entity,
        };

        for (index, record) in records.into_iter().enumerate() {
            report.records += 1;
            match self.project_record(entity, record, requested_id, tracker) {
                Ok(paths) => report.written.extend(paths),
                Err(error) => {
                    warn!(entity, index, error = %error, "Record projection failed");
                    report.failures.push(ProjectionFailure { index, error });
                }
            }
        }

        report
    }

    /// Project one record, returning the written paths in attribute order.
    pub fn project_record(
        &self,
        entity: &str,
        record: &Value,
        requested_id: &str,
        tracker: &mut SaveTracker,
    ) -> Result<Vec<VirtualPath>, ProjectionError> {
        let schema = self.registry.require_entity(entity)?;
        let version = self.registry.version();
        let naming_entity = match version {
            SchemaVersion::V2 => COMPONENT_NAMING_ENTITY,
            SchemaVersion::V1 => entity,
        };

        let mut dir = VirtualPath::root().join(&self.site.website_name);
        self.fs.create_directory(&dir)?;

        if schema.export_type.uses_type_folder() {
            dir = dir.join(&schema.folder);
            self.fs.create_directory(&dir)?;
        }

        if schema.attributes.is_empty() {
            return Err(ProjectionError::MissingAttributes {
                entity_type: entity.to_string(),
            });
        }

        let file_name = schema
            .file_name_field
            .as_deref()
            .and_then(|field| record.get(field))
            .and_then(Value::as_str)
            .map(normalize_file_name)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ProjectionError::MissingFileName {
                entity_type: entity.to_string(),
            })?;

        if schema.export_type == ExportType::SubFolders {
            dir = dir.join(&file_name);
            self.fs.create_directory(&dir)?;
        }

        let raw_content = record.get(CONTENT_FIELD).and_then(Value::as_str);
        let content = raw_content.map(parse_content).transpose()?;

        let entity_id = schema
            .primary_id_field
            .as_deref()
            .and_then(|field| record.get(field))
            .and_then(Value::as_str)
            .unwrap_or(requested_id);

        let language = self.languages.language_code(&self.site.website_id);
        let mut written = Vec::with_capacity(schema.attributes.len());

        for attribute in &schema.attributes {
            let body = match &content {
                Some(fields) => fields.get(attribute.as_str()),
                None => record.get(attribute.as_str()),
            }
            .and_then(Value::as_str)
            .unwrap_or(NO_CONTENT);

            let name = file_name_with_extension(naming_entity, &file_name, language, &file_extension(attribute));
            let path = dir.join(&name);

            self.fs.write_file(&path, body.as_bytes(), WriteOptions::upsert())?;
            debug!(path = %path, attribute = %attribute, bytes = body.len(), "Wrote file");

            tracker.record(
                path.clone(),
                SaveEntityDetails {
                    entity_id: entity_id.to_string(),
                    entity_type: schema.name.clone(),
                    attribute: attribute.clone(),
                    schema_version: version,
                    content: raw_content.unwrap_or(body).to_string(),
                },
            );
            written.push(path);
        }

        Ok(written)
    }
}

fn parse_content(raw: &str) -> Result<Map<String, Value>, ProjectionError> {
    serde_json::from_str(raw).map_err(|e| ProjectionError::InvalidContent(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFs;
    use serde_json::json;

    fn site() -> SiteContext {
        SiteContext::new("https://contoso.crm.dynamics.com", "contoso", "site-1")
    }

    fn read(fs: &MemoryFs, path: &str) -> String {
        String::from_utf8(fs.read_file(&VirtualPath::new(path)).unwrap()).unwrap()
    }

    #[test]
    fn test_v1_webpage_layout() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let record = json!({
            "adx_webpageid": "page-1",
            "adx_name": "Home",
            "adx_copy": "<h1>Hi</h1>",
            "adx_customcss": "h1{}",
        });
        let paths = projector
            .project_record("webpages", &record, "page-1", &mut tracker)
            .unwrap();

        assert_eq!(
            paths,
            vec![
                VirtualPath::new("/contoso/web-pages/home/home.en-US.webpage.custom_css.css"),
                VirtualPath::new("/contoso/web-pages/home/home.en-US.webpage.custom_javascript.js"),
                VirtualPath::new("/contoso/web-pages/home/home.en-US.webpage.copy.html"),
            ]
        );
        assert_eq!(read(&fs, "/contoso/web-pages/home/home.en-US.webpage.copy.html"), "<h1>Hi</h1>");
        assert_eq!(read(&fs, "/contoso/web-pages/home/home.en-US.webpage.custom_javascript.js"), "");

        let details = tracker.get(&paths[2]).unwrap();
        assert_eq!(details.entity_id, "page-1");
        assert_eq!(details.attribute, "adx_copy");
        assert_eq!(details.schema_version, SchemaVersion::V1);
    }

    #[test]
    fn test_single_folder_has_no_record_directory() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let record = json!({ "adx_name": "Footer/Text", "adx_value": "(c) Contoso" });
        let paths = projector
            .project_record("contentsnippets", &record, "snip-1", &mut tracker)
            .unwrap();

        assert_eq!(
            paths,
            vec![VirtualPath::new("/contoso/content-snippets/footer-text.contentsnippet.value.html")]
        );
        // Falls back to the requested id when the record has no id field.
        assert_eq!(tracker.get(&paths[0]).unwrap().entity_id, "snip-1");
    }

    #[test]
    fn test_missing_file_name_keeps_created_directories() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let err = projector
            .project_record("webpages", &json!({ "adx_copy": "x" }), "p", &mut tracker)
            .unwrap_err();

        assert!(err.is_missing_file_name());
        assert!(fs.is_dir(&VirtualPath::new("/contoso/web-pages")));
        assert!(fs.files().is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_entity_without_attributes() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let err = projector
            .project_record("websites", &json!({ "adx_name": "Contoso" }), "w", &mut tracker)
            .unwrap_err();
        assert!(matches!(err, ProjectionError::MissingAttributes { .. }));
    }

    #[test]
    fn test_v1_list_continues_past_bad_entry() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let response = json!({ "value": [
            { "adx_webtemplateid": "t-1", "adx_name": "Header", "adx_source": "<header/>" },
            { "adx_webtemplateid": "t-2", "adx_source": "orphan" },
            { "adx_webtemplateid": "t-3", "adx_name": "Footer", "adx_source": "<footer/>" },
        ]});
        let report = projector.project_response("webtemplates", &response, "t", &mut tracker);

        assert_eq!(report.records, 3);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert!(report.failures[0].error.is_missing_file_name());
        assert_eq!(read(&fs, "/contoso/web-templates/footer/footer.webtemplate.source.html"), "<footer/>");
        assert_eq!(
            report.last_written(),
            Some(&VirtualPath::new("/contoso/web-templates/footer/footer.webtemplate.source.html"))
        );
    }

    #[test]
    fn test_v2_component_record() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V2);
        let languages = LanguageMap::new()
            .with_website("site-1", "1036")
            .with_language("1036", "fr-FR");
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let content = r#"{"copy":"<p>Bonjour</p>","customcss":".a{}"}"#;
        let response = json!({
            "powerpagecomponentid": "c-1",
            "name": "Accueil",
            "content": content,
        });
        let report = projector.project_response("webpages", &response, "c-1", &mut tracker);

        assert!(report.failures.is_empty());
        assert_eq!(report.written.len(), 3);
        assert_eq!(
            read(&fs, "/contoso/web-pages/accueil/accueil.fr-FR.webpage.copy.html"),
            "<p>Bonjour</p>"
        );
        assert_eq!(
            read(&fs, "/contoso/web-pages/accueil/accueil.fr-FR.webpage.custom_css.css"),
            ".a{}"
        );

        let details = tracker
            .get(&VirtualPath::new("/contoso/web-pages/accueil/accueil.fr-FR.webpage.copy.html"))
            .unwrap();
        assert_eq!(details.entity_type, COMPONENT_ENTITY);
        assert_eq!(details.schema_version, SchemaVersion::V2);
        assert_eq!(details.content, content);
    }

    #[test]
    fn test_v2_fields_missing_from_content_write_empty_files() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V2);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let response = json!({
            "powerpagecomponentid": "c-2",
            "name": "Contact",
            "content": r#"{"copy":"<p>Call us</p>"}"#,
        });
        let report = projector.project_response("webpages", &response, "c-2", &mut tracker);

        assert_eq!(report.written.len(), 3);
        assert_eq!(
            read(&fs, "/contoso/web-pages/contact/contact.en-US.webpage.copy.html"),
            "<p>Call us</p>"
        );
        assert_eq!(read(&fs, "/contoso/web-pages/contact/contact.en-US.webpage.custom_css.css"), "");
        assert_eq!(
            read(&fs, "/contoso/web-pages/contact/contact.en-US.webpage.custom_javascript.js"),
            ""
        );
    }

    #[test]
    fn test_v2_invalid_content() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V2);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let response = json!({ "name": "x", "content": "{broken" });
        let report = projector.project_response("webpages", &response, "c", &mut tracker);
        assert!(matches!(report.failures[0].error, ProjectionError::InvalidContent(_)));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let fs = MemoryFs::new();
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let languages = LanguageMap::new();
        let site = site();
        let projector = Projector::new(&fs, &registry, &languages, &site);
        let mut tracker = SaveTracker::new();

        let response = json!({ "value": [
            { "adx_webpageid": "p-1", "adx_name": "About", "adx_copy": "about us" },
        ]});

        let first = projector.project_response("webpages", &response, "p-1", &mut tracker);
        let first_files: Vec<(VirtualPath, Vec<u8>)> = fs
            .files()
            .into_iter()
            .map(|p| {
                let data = fs.read_file(&p).unwrap();
                (p, data)
            })
            .collect();
        let first_map = tracker.export();

        let second = projector.project_response("webpages", &response, "p-1", &mut tracker);
        let second_files: Vec<(VirtualPath, Vec<u8>)> = fs
            .files()
            .into_iter()
            .map(|p| {
                let data = fs.read_file(&p).unwrap();
                (p, data)
            })
            .collect();

        assert_eq!(first.written, second.written);
        assert_eq!(first_files, second_files);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.export(), first_map);
    }
}
