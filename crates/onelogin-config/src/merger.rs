//! Configuration merging with priority ordering
//!
//! Priority order (lowest to highest):
//! 1. Defaults - hardcoded sane defaults
//! 2. File config - from onelogin.toml
//! 3. Environment variables - ONELOGIN_* pattern
//! 4. Explicit - values passed by the caller (provider block, CLI flags)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::provider::{DEFAULT_TIMEOUT_SECS, ProviderConfig};
use crate::secret::SecretString;

/// Priority levels for configuration sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Default = 0,
    File = 10,
    Environment = 20,
    Explicit = 30,
}

/// Partial configuration that may have some fields set
///
/// Each field is optional so a source can override only what it knows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "timeout")]
    pub timeout_secs: Option<u64>,
}

impl PartialConfig {
    /// Create an empty partial config
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::parse(format!("TOML parse error: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.client_id.is_none()
            && self.client_secret.is_none()
            && self.url.is_none()
            && self.subdomain.is_none()
            && self.region.is_none()
            && self.timeout_secs.is_none()
    }

    /// Names of the fields this partial config sets
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.client_id.is_some() {
            fields.push("client_id");
        }
        if self.client_secret.is_some() {
            fields.push("client_secret");
        }
        if self.url.is_some() {
            fields.push("url");
        }
        if self.subdomain.is_some() {
            fields.push("subdomain");
        }
        if self.region.is_some() {
            fields.push("region");
        }
        if self.timeout_secs.is_some() {
            fields.push("timeout_secs");
        }
        fields
    }
}

/// Merges partial configurations, keeping the highest-priority value per field
#[derive(Debug, Clone)]
pub struct ConfigMerger {
    merged: PartialConfig,
    sources: HashMap<&'static str, Priority>,
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ConfigMerger {
    /// Create with default values
    pub fn defaults() -> Self {
        let merged = PartialConfig {
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            ..PartialConfig::default()
        };
        let mut sources = HashMap::new();
        sources.insert("timeout_secs", Priority::Default);
        Self { merged, sources }
    }

    /// Merge a partial config with the given priority
    pub fn merge(&mut self, partial: PartialConfig, priority: Priority) -> &mut Self {
        let PartialConfig {
            client_id,
            client_secret,
            url,
            subdomain,
            region,
            timeout_secs,
        } = partial;

        self.apply("client_id", priority, client_id, |m| &mut m.client_id);
        self.apply("client_secret", priority, client_secret, |m| {
            &mut m.client_secret
        });
        self.apply("url", priority, url, |m| &mut m.url);
        self.apply("subdomain", priority, subdomain, |m| &mut m.subdomain);
        self.apply("region", priority, region, |m| &mut m.region);
        self.apply("timeout_secs", priority, timeout_secs, |m| {
            &mut m.timeout_secs
        });
        self
    }

    fn apply<T>(
        &mut self,
        field: &'static str,
        priority: Priority,
        value: Option<T>,
        slot: impl FnOnce(&mut PartialConfig) -> &mut Option<T>,
    ) {
        let Some(value) = value else {
            return;
        };
        let should_override = self
            .sources
            .get(field)
            .map(|&existing| existing <= priority)
            .unwrap_or(true);
        if should_override {
            *slot(&mut self.merged) = Some(value);
            self.sources.insert(field, priority);
        }
    }

    /// Get the source priority a field was taken from
    pub fn source_of(&self, field: &str) -> Option<Priority> {
        self.sources.get(field).copied()
    }

    /// Get the merged partial configuration
    pub fn merged(&self) -> &PartialConfig {
        &self.merged
    }

    /// Builds and validates the final provider configuration
    pub fn build(&self) -> Result<ProviderConfig, ConfigError> {
        let merged = self.merged.clone();
        let config = ProviderConfig {
            client_id: merged.client_id.unwrap_or_default(),
            client_secret: merged.client_secret.unwrap_or_default(),
            url: merged.url.filter(|u| !u.is_empty()),
            subdomain: merged.subdomain.filter(|s| !s.is_empty()),
            region: merged.region.filter(|r| !r.is_empty()),
            timeout_secs: merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(client_id: &str) -> PartialConfig {
        PartialConfig {
            client_id: Some(client_id.to_string()),
            ..PartialConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let merger = ConfigMerger::defaults();
        assert_eq!(merger.merged().timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(merger.source_of("timeout_secs"), Some(Priority::Default));
        assert_eq!(merger.source_of("client_id"), None);
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_order() {
        let mut merger = ConfigMerger::defaults();
        merger.merge(partial("explicit"), Priority::Explicit);
        merger.merge(partial("file"), Priority::File);
        merger.merge(partial("env"), Priority::Environment);

        assert_eq!(merger.merged().client_id.as_deref(), Some("explicit"));
        assert_eq!(merger.source_of("client_id"), Some(Priority::Explicit));
    }

    #[test]
    fn test_unset_fields_do_not_clear_lower_sources() {
        let mut merger = ConfigMerger::defaults();
        merger.merge(
            PartialConfig {
                url: Some("https://acme.onelogin.com".to_string()),
                ..PartialConfig::default()
            },
            Priority::File,
        );
        merger.merge(partial("id"), Priority::Explicit);

        assert_eq!(
            merger.merged().url.as_deref(),
            Some("https://acme.onelogin.com")
        );
        assert_eq!(merger.source_of("url"), Some(Priority::File));
    }

    #[test]
    fn test_partial_from_toml() {
        let cfg = PartialConfig::from_toml(
            r#"
client_id = "abc"
client_secret = "xyz"
subdomain = "acme"
timeout = 30
"#,
        )
        .unwrap();
        assert_eq!(cfg.client_id.as_deref(), Some("abc"));
        assert_eq!(cfg.subdomain.as_deref(), Some("acme"));
        assert_eq!(cfg.timeout_secs, Some(30));
        assert_eq!(
            cfg.fields(),
            vec!["client_id", "client_secret", "subdomain", "timeout_secs"]
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = PartialConfig::from_toml("client_id = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
