//! Environment-variable configuration source

use std::collections::HashMap;
use std::fmt;

use crate::merger::PartialConfig;
use crate::{ConfigError, Result};

pub const ENV_CLIENT_ID: &str = "ONELOGIN_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "ONELOGIN_CLIENT_SECRET";
pub const ENV_API_URL: &str = "ONELOGIN_API_URL";
/// Older spelling of [`ENV_API_URL`], consulted when that one is unset
pub const ENV_OAPI_URL: &str = "ONELOGIN_OAPI_URL";
pub const ENV_SUBDOMAIN: &str = "ONELOGIN_SUBDOMAIN";
pub const ENV_REGION: &str = "ONELOGIN_REGION";
pub const ENV_CLIENT_TIMEOUT: &str = "ONELOGIN_CLIENT_TIMEOUT";

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads `ONELOGIN_*` variables through a lookup function.
pub struct EnvSource {
    lookup: Lookup,
}

impl fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSource").finish_non_exhaustive()
    }
}

impl EnvSource {
    pub fn new(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Reads from the process environment
    pub fn from_process() -> Self {
        Self::new(|key| std::env::var(key).ok())
    }

    /// Reads from a fixed set of pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(move |key| vars.get(key).cloned())
    }

    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }

    pub fn read(&self) -> Result<PartialConfig> {
        let timeout_secs = match self.get(ENV_CLIENT_TIMEOUT) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::parse(format!("{ENV_CLIENT_TIMEOUT}={raw} is not a number: {e}"))
            })?),
            None => None,
        };

        Ok(PartialConfig {
            client_id: self.get(ENV_CLIENT_ID),
            client_secret: self.get(ENV_CLIENT_SECRET).map(Into::into),
            url: self.get(ENV_API_URL).or_else(|| self.get(ENV_OAPI_URL)),
            subdomain: self.get(ENV_SUBDOMAIN),
            region: self.get(ENV_REGION),
            timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_all_variables() {
        let env = EnvSource::from_pairs([
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_API_URL, "https://acme.onelogin.com"),
            (ENV_SUBDOMAIN, "acme"),
            (ENV_REGION, "us"),
            (ENV_CLIENT_TIMEOUT, "15"),
        ]);
        let cfg = env.read().unwrap();
        assert_eq!(cfg.client_id.as_deref(), Some("id"));
        assert_eq!(cfg.client_secret.unwrap().expose(), "secret");
        assert_eq!(cfg.url.as_deref(), Some("https://acme.onelogin.com"));
        assert_eq!(cfg.subdomain.as_deref(), Some("acme"));
        assert_eq!(cfg.region.as_deref(), Some("us"));
        assert_eq!(cfg.timeout_secs, Some(15));
    }

    #[test]
    fn test_oapi_url_alias() {
        let env = EnvSource::from_pairs([(ENV_OAPI_URL, "https://old.onelogin.com")]);
        assert_eq!(
            env.read().unwrap().url.as_deref(),
            Some("https://old.onelogin.com")
        );

        let env = EnvSource::from_pairs([
            (ENV_OAPI_URL, "https://old.onelogin.com"),
            (ENV_API_URL, "https://new.onelogin.com"),
        ]);
        assert_eq!(
            env.read().unwrap().url.as_deref(),
            Some("https://new.onelogin.com")
        );
    }

    #[test]
    fn test_empty_values_are_absent() {
        let env = EnvSource::from_pairs([(ENV_CLIENT_ID, "")]);
        assert!(env.read().unwrap().is_empty());
    }

    #[test]
    fn test_bad_timeout() {
        let env = EnvSource::from_pairs([(ENV_CLIENT_TIMEOUT, "soon")]);
        let err = env.read().unwrap_err();
        assert!(err.to_string().contains("ONELOGIN_CLIENT_TIMEOUT=soon"));
    }
}
