//! Entity request URLs.

use super::{keys, SchemaError, SchemaRegistry};

/// Placeholder substituted with the requested record id.
const ENTITY_ID_PLACEHOLDER: &str = "{entityId}";

/// HTTP verb a request URL is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Patch,
}

impl SchemaRegistry {
    /// Build the record URL for an entity type.
    ///
    /// `GET` URLs carry the entity's fetch query. A query that filters on
    /// `{entityId}` yields a list response; otherwise the record is addressed
    /// by key and a single record comes back. `PATCH` URLs always address the
    /// record by key.
    pub fn request_url(
        &self,
        org_url: &str,
        entity: &str,
        entity_id: &str,
        method: HttpMethod,
    ) -> Result<String, SchemaError> {
        let schema = self.require_entity(entity)?;
        let base = format!(
            "{}/{}/{}/{}/{}",
            org_url.trim_end_matches('/'),
            self.data_source_value(keys::API),
            self.data_source_value(keys::DATA),
            self.data_source_value(keys::VERSION),
            schema.entity_set
        );

        let url = match (method, schema.fetch_query.as_deref()) {
            (HttpMethod::Get, Some(query)) if query.contains(ENTITY_ID_PLACEHOLDER) => {
                format!("{}{}", base, query.replace(ENTITY_ID_PLACEHOLDER, entity_id))
            }
            (HttpMethod::Get, Some(query)) => format!("{}({}){}", base, entity_id, query),
            _ => format!("{}({})", base, entity_id),
        };
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaVersion;

    const ORG: &str = "https://contoso.crm.dynamics.com/";
    const ID: &str = "5b4a1b2c-0000-0000-0000-000000000001";

    #[test]
    fn test_v1_get_filters_by_id() {
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let url = registry
            .request_url(ORG, "webtemplates", ID, HttpMethod::Get)
            .unwrap();
        assert_eq!(
            url,
            format!(
                "https://contoso.crm.dynamics.com/api/data/v9.2/adx_webtemplates?$filter=adx_webtemplateid eq {}&$select=adx_webtemplateid,adx_name,adx_source",
                ID
            )
        );
    }

    #[test]
    fn test_v2_get_addresses_record() {
        let registry = SchemaRegistry::new(SchemaVersion::V2);
        let url = registry
            .request_url(ORG, "powerpagecomponents", ID, HttpMethod::Get)
            .unwrap();
        assert_eq!(
            url,
            format!(
                "https://contoso.crm.dynamics.com/api/data/v9.2/powerpagecomponents({})?$select=powerpagecomponentid,name,content,powerpagecomponenttype",
                ID
            )
        );
    }

    #[test]
    fn test_patch_has_no_query() {
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        let url = registry
            .request_url(ORG, "webpages", ID, HttpMethod::Patch)
            .unwrap();
        assert_eq!(
            url,
            format!("https://contoso.crm.dynamics.com/api/data/v9.2/adx_webpages({})", ID)
        );
    }

    #[test]
    fn test_unknown_entity() {
        let registry = SchemaRegistry::new(SchemaVersion::V1);
        assert!(registry
            .request_url(ORG, "powerpagecomponents", ID, HttpMethod::Get)
            .is_err());
    }
}
