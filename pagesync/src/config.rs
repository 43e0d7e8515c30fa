//! Configuration file handling.
//!
//! Settings live in `~/.pagesync/config.ini`. A missing file means defaults;
//! a missing key means that key's default.
//!
//! ```ini
//! [network]
//! probe_timeout_secs = 10
//! request_timeout_secs = 30
//!
//! [geo]
//! supported = us,wus,eu,uk,jp,in,au,ca,apj
//! disabled = gov,high,dod,mooncake
//!
//! [endpoint]
//! service = aibuildertextapiservice
//! platform_domain = powerapps.com
//! api_path = appintelligence/chat
//!
//! [portal]
//! default_language = en-US
//! policy_api_version = 2021-04-01
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::geo::{ResolverConfig, DEFAULT_PROBE_TIMEOUT_SECS};
use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::policy::{
    EndpointTemplate, GeoPolicy, DEFAULT_DISABLED_GEOS, DEFAULT_POLICY_API_VERSION,
    DEFAULT_SUPPORTED_GEOS,
};
use crate::project::{LanguageMap, DEFAULT_LANGUAGE_CODE};

const CONFIG_DIR_NAME: &str = ".pagesync";
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Upper bound for one cluster discovery probe.
    pub probe_timeout_secs: u64,
    /// Timeout applied by the HTTP client to every request.
    pub request_timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoSettings {
    pub supported: Vec<String>,
    pub disabled: Vec<String>,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            supported: DEFAULT_SUPPORTED_GEOS.iter().map(|g| g.to_string()).collect(),
            disabled: DEFAULT_DISABLED_GEOS.iter().map(|g| g.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    pub service: String,
    pub platform_domain: String,
    pub api_path: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        let template = EndpointTemplate::default();
        Self {
            service: template.service,
            platform_domain: template.platform_domain,
            api_path: template.api_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSettings {
    pub default_language: String,
    pub policy_api_version: String,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE_CODE.to_string(),
            policy_api_version: DEFAULT_POLICY_API_VERSION.to_string(),
        }
    }
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub network: NetworkSettings,
    pub geo: GeoSettings,
    pub endpoint: EndpointSettings,
    pub portal: PortalSettings,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Write every setting to `path`, creating its directory when needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_err)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .with_probe_timeout(Duration::from_secs(self.network.probe_timeout_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_secs)
    }

    pub fn geo_policy(&self) -> GeoPolicy {
        GeoPolicy::new(&self.geo.supported, &self.geo.disabled)
    }

    pub fn endpoint_template(&self) -> EndpointTemplate {
        EndpointTemplate::default()
            .with_service(&self.endpoint.service)
            .with_platform_domain(&self.endpoint.platform_domain)
            .with_api_path(&self.endpoint.api_path)
    }

    /// Language map with the configured default and no site mappings.
    pub fn language_map(&self) -> LanguageMap {
        LanguageMap::new().with_default_code(&self.portal.default_language)
    }
}

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    NetworkProbeTimeoutSecs,
    NetworkRequestTimeoutSecs,
    GeoSupported,
    GeoDisabled,
    EndpointService,
    EndpointPlatformDomain,
    EndpointApiPath,
    PortalDefaultLanguage,
    PortalPolicyApiVersion,
}

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::NetworkProbeTimeoutSecs,
            ConfigKey::NetworkRequestTimeoutSecs,
            ConfigKey::GeoSupported,
            ConfigKey::GeoDisabled,
            ConfigKey::EndpointService,
            ConfigKey::EndpointPlatformDomain,
            ConfigKey::EndpointApiPath,
            ConfigKey::PortalDefaultLanguage,
            ConfigKey::PortalPolicyApiVersion,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::NetworkProbeTimeoutSecs | ConfigKey::NetworkRequestTimeoutSecs => "network",
            ConfigKey::GeoSupported | ConfigKey::GeoDisabled => "geo",
            ConfigKey::EndpointService
            | ConfigKey::EndpointPlatformDomain
            | ConfigKey::EndpointApiPath => "endpoint",
            ConfigKey::PortalDefaultLanguage | ConfigKey::PortalPolicyApiVersion => "portal",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::NetworkProbeTimeoutSecs => "probe_timeout_secs",
            ConfigKey::NetworkRequestTimeoutSecs => "request_timeout_secs",
            ConfigKey::GeoSupported => "supported",
            ConfigKey::GeoDisabled => "disabled",
            ConfigKey::EndpointService => "service",
            ConfigKey::EndpointPlatformDomain => "platform_domain",
            ConfigKey::EndpointApiPath => "api_path",
            ConfigKey::PortalDefaultLanguage => "default_language",
            ConfigKey::PortalPolicyApiVersion => "policy_api_version",
        }
    }

    /// `section.key`
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it is stored in the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::NetworkProbeTimeoutSecs => config.network.probe_timeout_secs.to_string(),
            ConfigKey::NetworkRequestTimeoutSecs => config.network.request_timeout_secs.to_string(),
            ConfigKey::GeoSupported => config.geo.supported.join(","),
            ConfigKey::GeoDisabled => config.geo.disabled.join(","),
            ConfigKey::EndpointService => config.endpoint.service.clone(),
            ConfigKey::EndpointPlatformDomain => config.endpoint.platform_domain.clone(),
            ConfigKey::EndpointApiPath => config.endpoint.api_path.clone(),
            ConfigKey::PortalDefaultLanguage => config.portal.default_language.clone(),
            ConfigKey::PortalPolicyApiVersion => config.portal.policy_api_version.clone(),
        }
    }

    /// Parse and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::NetworkProbeTimeoutSecs => {
                config.network.probe_timeout_secs = self.parse_secs(value)?
            }
            ConfigKey::NetworkRequestTimeoutSecs => {
                config.network.request_timeout_secs = self.parse_secs(value)?
            }
            ConfigKey::GeoSupported => config.geo.supported = parse_list(value),
            ConfigKey::GeoDisabled => config.geo.disabled = parse_list(value),
            ConfigKey::EndpointService => config.endpoint.service = self.non_empty(value)?,
            ConfigKey::EndpointPlatformDomain => {
                config.endpoint.platform_domain = self.non_empty(value)?
            }
            ConfigKey::EndpointApiPath => config.endpoint.api_path = self.non_empty(value)?,
            ConfigKey::PortalDefaultLanguage => {
                config.portal.default_language = self.non_empty(value)?
            }
            ConfigKey::PortalPolicyApiVersion => {
                config.portal.policy_api_version = self.non_empty(value)?
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_secs(&self, value: &str) -> Result<u64, ConfigError> {
        match value.parse::<u64>() {
            Ok(0) => Err(self.invalid(value, "must be greater than zero")),
            Ok(secs) => Ok(secs),
            Err(e) => Err(self.invalid(value, &e.to_string())),
        }
    }

    fn non_empty(&self, value: &str) -> Result<String, ConfigError> {
        if value.is_empty() {
            return Err(self.invalid(value, "must not be empty"));
        }
        Ok(value.to_string())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|g| g.trim().to_ascii_lowercase())
        .filter(|g| !g.is_empty())
        .collect()
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(
            &path,
            "[network]\nprobe_timeout_secs = 3\n\n[geo]\ndisabled = GOV, high\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();

        assert_eq!(config.network.probe_timeout_secs, 3);
        assert_eq!(config.network.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.geo.disabled, vec!["gov", "high"]);
        assert_eq!(config.geo.supported, GeoSettings::default().supported);
        assert_eq!(config.resolver_config().probe_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[network]\nrequest_timeout_secs = soon\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.endpoint.service = "customservice".to_string();
        config.portal.default_language = "fr-FR".to_string();
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.language_map().default_code(), "fr-FR");
    }

    #[test]
    fn test_key_names() {
        let key: ConfigKey = "endpoint.api_path".parse().unwrap();
        assert_eq!(key, ConfigKey::EndpointApiPath);
        assert_eq!(key.to_string(), "endpoint.api_path");
        assert!("endpoint.nope".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_geo_policy_from_config() {
        let mut config = ConfigFile::default();
        ConfigKey::GeoSupported.set(&mut config, "us, zz").unwrap();

        let policy = config.geo_policy();
        assert!(policy.is_supported("ZZ"));
        assert!(!policy.is_supported("eu"));
        assert!(policy.is_disabled("gov"));
    }
}
