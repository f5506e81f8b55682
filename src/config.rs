//! Configuration loading.
//!
//! Cache settings are read from a TOML file:
//!
//! ```toml
//! [cache]
//! enabled = true
//! max_entries = 10000
//! default_ttl_secs = 3600
//! default_key = "tenant-a"
//! ```
//!
//! Every field is optional. Apply the result with
//! [`CachingGatewayBuilder::settings()`](crate::CachingGatewayBuilder::settings)
//! and [`CacheSettings::store_config()`].

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cache::StoreConfig;
use crate::{RatatoskrError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Caching layer settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheSettings {
    /// Whether the gateway consults its store at all (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Store capacity (default: 10,000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Default time-to-live, in seconds, when a call sets none.
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,
    /// Cache key used when a call passes a `null` `prompt_cache_key`.
    #[serde(default)]
    pub default_key: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_entries: default_max_entries(),
            default_ttl_secs: None,
            default_key: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_entries() -> u64 {
    10_000
}

impl CacheSettings {
    /// Store configuration derived from these settings.
    ///
    /// The default ttl is applied per call by the gateway, so the store
    /// itself is left without one.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new().max_entries(self.max_entries)
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RatatoskrError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RatatoskrError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| {
            RatatoskrError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            RatatoskrError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.cache.default_ttl_secs, None);
        assert_eq!(config.cache.default_key, None);
    }

    #[test]
    fn parse_empty_config() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.cache, CacheSettings::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [cache]
            enabled = false
            max_entries = 50
            default_ttl_secs = 120
            default_key = "tenant-a"
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, 50);
        assert_eq!(config.cache.default_ttl_secs, Some(120));
        assert_eq!(config.cache.default_key.as_deref(), Some("tenant-a"));
        assert_eq!(config.cache.store_config().max_entries, 50);
    }

    #[test]
    fn parse_error_is_configuration_error() {
        let err = Config::from_toml_str("[cache]\nmax_entries = \"many\"").unwrap_err();
        assert!(matches!(err, RatatoskrError::Configuration(_)));
    }

    #[test]
    fn config_not_found_returns_error() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
