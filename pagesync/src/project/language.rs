//! Website → language lookups.

use std::collections::HashMap;

/// Language code used when a site has no language mapping.
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Resolves the language code used in localized file names.
///
/// Two read-only tables: website id → LCID, and LCID → language code.
#[derive(Debug, Clone)]
pub struct LanguageMap {
    website_lcid: HashMap<String, String>,
    lcid_code: HashMap<String, String>,
    default_code: String,
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self {
            website_lcid: HashMap::new(),
            lcid_code: HashMap::new(),
            default_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }
}

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_code(mut self, code: impl Into<String>) -> Self {
        self.default_code = code.into();
        self
    }

    pub fn with_website(mut self, website_id: impl Into<String>, lcid: impl Into<String>) -> Self {
        self.website_lcid.insert(website_id.into(), lcid.into());
        self
    }

    pub fn with_language(mut self, lcid: impl Into<String>, code: impl Into<String>) -> Self {
        self.lcid_code.insert(lcid.into(), code.into());
        self
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    /// Language code for a website, or the default when either lookup misses.
    pub fn language_code(&self, website_id: &str) -> &str {
        self.website_lcid
            .get(website_id)
            .and_then(|lcid| self.lcid_code.get(lcid))
            .map(String::as_str)
            .unwrap_or(&self.default_code)
    }
}
