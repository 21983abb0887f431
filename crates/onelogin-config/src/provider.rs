use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::merger::{ConfigMerger, PartialConfig, Priority};
use crate::secret::SecretString;
use crate::sources::{EnvSource, FileSource};
use crate::{ConfigError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolved provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    /// OneLogin API URL, e.g. `https://acme.onelogin.com`. Takes priority over
    /// `subdomain`.
    #[serde(default)]
    pub url: Option<String>,
    /// Deprecated, use `url`
    #[serde(default)]
    pub subdomain: Option<String>,
    /// Deprecated and ignored
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_timeout_secs", alias = "timeout")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ProviderConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<SecretString>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            url: None,
            subdomain: None,
            region: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(ConfigError::MissingCredentials(
                "client_id or client_secret missing".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::validation("timeout must be > 0"));
        }
        if let Some(url) = &self.url {
            Url::parse(url)
                .map_err(|e| ConfigError::validation(format!("invalid url {url}: {e}")))?;
        }
        if self.region.is_some() {
            tracing::warn!("`region` is deprecated and ignored, use `url` instead");
        }
        if self.url.is_none() && self.subdomain.is_some() {
            tracing::warn!("`subdomain` is deprecated, use `url` instead");
        }
        Ok(())
    }

    /// Base URL of the OneLogin API.
    ///
    /// `url` wins over `subdomain`; a subdomain expands to
    /// `https://{subdomain}.onelogin.com`.
    pub fn api_base_url(&self) -> Result<Url> {
        let raw = match (&self.url, &self.subdomain) {
            (Some(url), _) => url.clone(),
            (None, Some(subdomain)) => format!("https://{subdomain}.onelogin.com"),
            (None, None) => {
                return Err(ConfigError::MissingEndpoint(
                    "Either OneLogin API URL or subdomain is required".to_string(),
                ));
            }
        };
        Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| ConfigError::validation(format!("invalid url {raw}: {e}")))
    }

    /// Tenant subdomain, taken from `url` when present.
    pub fn subdomain(&self) -> Option<String> {
        match &self.url {
            Some(url) => {
                let host = url
                    .trim_start_matches("https://")
                    .trim_start_matches("http://");
                host.split('.')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            }
            None => self.subdomain.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where to load configuration from
#[derive(Debug, Default)]
pub struct LoadOptions {
    /// TOML file; a missing file is not an error
    pub file: Option<PathBuf>,
    /// Environment source; `None` skips the environment entirely
    pub env: Option<EnvSource>,
    /// Explicitly configured values
    pub explicit: PartialConfig,
}

/// Load, merge and validate provider configuration
pub fn load_config(options: LoadOptions) -> Result<ProviderConfig> {
    let mut merger = ConfigMerger::defaults();

    if let Some(path) = options.file {
        let partial = FileSource::from_path(path).read()?;
        merger.merge(partial, Priority::File);
    }
    if let Some(env) = options.env {
        merger.merge(env.read()?, Priority::Environment);
    }
    merger.merge(options.explicit, Priority::Explicit);

    let config = merger.build()?;
    tracing::debug!(
        client_id_source = ?merger.source_of("client_id"),
        url_source = ?merger.source_of("url"),
        timeout_secs = config.timeout_secs,
        "provider configuration loaded"
    );
    Ok(config)
}
