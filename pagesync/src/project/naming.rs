//! File naming for projected attributes.
//!
//! A projected file is named `{record}.{language}.{extension}` for web pages
//! and `{record}.{extension}` for everything else, where the extension comes
//! from a fixed attribute table, e.g. `home.en-US.webpage.copy.html`.

/// Attribute → file extension.
const COLUMN_EXTENSIONS: &[(&str, &str)] = &[
    ("adx_copy", "webpage.copy.html"),
    ("adx_customcss", "webpage.custom_css.css"),
    ("adx_customjavascript", "webpage.custom_javascript.js"),
    ("adx_source", "webtemplate.source.html"),
    ("adx_value", "contentsnippet.value.html"),
    ("copy", "webpage.copy.html"),
    ("customcss", "webpage.custom_css.css"),
    ("customjavascript", "webpage.custom_javascript.js"),
];

/// Entity names whose files carry a language segment.
const LOCALIZED_ENTITIES: &[&str] = &["webpages", "webpage"];

/// Extension for an attribute; unknown attributes get `{attribute}.txt`.
pub fn file_extension(attribute: &str) -> String {
    COLUMN_EXTENSIONS
        .iter()
        .find(|(column, _)| *column == attribute)
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_else(|| format!("{}.txt", attribute))
}

pub fn is_localized(entity: &str) -> bool {
    LOCALIZED_ENTITIES.contains(&entity)
}

/// Lowercase a record name and make it a single path segment.
pub fn normalize_file_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect()
}

pub fn file_name_with_extension(entity: &str, base: &str, language: &str, extension: &str) -> String {
    if is_localized(entity) {
        format!("{}.{}.{}", base, language, extension)
    } else {
        format!("{}.{}", base, extension)
    }
}
