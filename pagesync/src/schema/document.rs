//! Static schema documents.
//!
//! Each entity entry is a flat list of `(key, value)` pairs; see
//! [`super::keys`] for the keys in use. Attribute lists are comma-joined.

/// One schema document.
pub(crate) struct SchemaDocument {
    pub data_source: &'static [(&'static str, &'static str)],
    pub entities: &'static [&'static [(&'static str, &'static str)]],
}

pub(crate) static PORTAL_SCHEMA_V1: SchemaDocument = SchemaDocument {
    data_source: &[
        ("api", "api"),
        ("data", "data"),
        ("version", "v9.2"),
        ("schema", "portalschemav1"),
    ],
    entities: &[
        &[
            ("_name", "websites"),
            ("_displayname", "Website"),
            ("_entitysetname", "adx_websites"),
            ("_primaryidfield", "adx_websiteid"),
            ("_primarynamefield", "adx_name"),
            ("_foldername", ""),
            ("_exporttype", ""),
            ("_propertiesext", "website.yml"),
            (
                "_fetchQueryParameters",
                "?$select=adx_name,adx_websiteid,_adx_defaultlanguage_value",
            ),
            ("_attributes", ""),
        ],
        &[
            ("_name", "webpages"),
            ("_displayname", "Web Page"),
            ("_entitysetname", "adx_webpages"),
            ("_primaryidfield", "adx_webpageid"),
            ("_primarynamefield", "adx_name"),
            ("_foldername", "web-pages"),
            ("_exporttype", "SubFolders"),
            ("_propertiesext", "webpage.yml"),
            (
                "_fetchQueryParameters",
                "?$filter=adx_webpageid eq {entityId}&$select=adx_webpageid,adx_name,adx_copy,adx_customcss,adx_customjavascript,adx_partialurl",
            ),
            ("_attributes", "adx_customcss,adx_customjavascript,adx_copy"),
        ],
        &[
            ("_name", "webtemplates"),
            ("_displayname", "Web Template"),
            ("_entitysetname", "adx_webtemplates"),
            ("_primaryidfield", "adx_webtemplateid"),
            ("_primarynamefield", "adx_name"),
            ("_foldername", "web-templates"),
            ("_exporttype", "SubFolders"),
            ("_propertiesext", "webtemplate.yml"),
            (
                "_fetchQueryParameters",
                "?$filter=adx_webtemplateid eq {entityId}&$select=adx_webtemplateid,adx_name,adx_source",
            ),
            ("_attributes", "adx_source"),
        ],
        &[
            ("_name", "contentsnippets"),
            ("_displayname", "Content Snippet"),
            ("_entitysetname", "adx_contentsnippets"),
            ("_primaryidfield", "adx_contentsnippetid"),
            ("_primarynamefield", "adx_name"),
            ("_foldername", "content-snippets"),
            ("_exporttype", "SingleFolder"),
            ("_propertiesext", "contentsnippet.yml"),
            (
                "_fetchQueryParameters",
                "?$filter=adx_contentsnippetid eq {entityId}&$select=adx_contentsnippetid,adx_name,adx_value",
            ),
            ("_attributes", "adx_value"),
        ],
    ],
};

pub(crate) static PORTAL_SCHEMA_V2: SchemaDocument = SchemaDocument {
    data_source: &[
        ("api", "api"),
        ("data", "data"),
        ("version", "v9.2"),
        ("schema", "portalschemav2"),
    ],
    entities: &[
        &[
            ("_name", "websites"),
            ("_displayname", "Website"),
            ("_entitysetname", "powerpagesites"),
            ("_primaryidfield", "powerpagesiteid"),
            ("_primarynamefield", "name"),
            ("_foldername", ""),
            ("_exporttype", ""),
            ("_propertiesext", "website.yml"),
            ("_fetchQueryParameters", "?$select=powerpagesiteid,name,content"),
            ("_attributes", ""),
        ],
        &[
            ("_name", "powerpagecomponents"),
            ("_displayname", "Power Page Component"),
            ("_entitysetname", "powerpagecomponents"),
            ("_primaryidfield", "powerpagecomponentid"),
            ("_primarynamefield", "name"),
            ("_foldername", "web-pages"),
            ("_exporttype", "SubFolders"),
            ("_propertiesext", "webpage.yml"),
            (
                "_fetchQueryParameters",
                "?$select=powerpagecomponentid,name,content,powerpagecomponenttype",
            ),
            ("_attributes", "customcss,customjavascript,copy"),
        ],
    ],
};
