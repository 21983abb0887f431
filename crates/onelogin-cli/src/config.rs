use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use onelogin_config::{
    ConfigMerger, EnvSource, FileSource, PartialConfig, Priority, ProviderConfig, SecretString,
};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};

/// One named profile in `~/.onelogin/config.toml`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct ProfileConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub url: Option<String>,
    pub subdomain: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<String>,
}

impl ProfileConfig {
    fn into_partial(self) -> PartialConfig {
        PartialConfig {
            client_id: self.client_id,
            client_secret: self.client_secret.map(SecretString::new),
            url: self.url,
            subdomain: self.subdomain,
            timeout_secs: self.timeout_secs,
            ..PartialConfig::default()
        }
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        match self.format.as_deref() {
            Some("json") => Some(OutputFormat::Json),
            Some("table") => Some(OutputFormat::Table),
            _ => None,
        }
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

pub fn profiles_path() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".onelogin")
        .join("config.toml"))
}

pub fn load_profiles(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profiles: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid profiles file: {}", path.display()))
}

pub fn load_profile(path: &Path, profile: &str) -> Result<ProfileConfig> {
    let mut all = load_profiles(path)?;
    Ok(all.remove(profile).unwrap_or_default())
}

fn explicit_from_flags(cli: &Cli) -> PartialConfig {
    PartialConfig {
        client_id: cli.client_id.clone(),
        client_secret: cli.client_secret.as_deref().map(SecretString::new),
        url: cli.url.clone(),
        subdomain: cli.subdomain.clone(),
        timeout_secs: cli.timeout,
        ..PartialConfig::default()
    }
}

/// Merges, lowest to highest: defaults, `--config` file, profile,
/// environment, flags.
pub fn resolve_provider_config(
    cli: &Cli,
    profile: ProfileConfig,
    env: EnvSource,
) -> Result<ProviderConfig> {
    let mut merger = ConfigMerger::defaults();
    if let Some(path) = &cli.config {
        let partial = FileSource::from_path(path.clone())
            .read()
            .with_context(|| format!("Failed to load {}", path.display()))?;
        merger.merge(partial, Priority::File);
    }
    merger.merge(profile.into_partial(), Priority::File);
    merger.merge(env.read()?, Priority::Environment);
    merger.merge(explicit_from_flags(cli), Priority::Explicit);
    Ok(merger.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("onelogin").chain(args.iter().copied()))
    }

    #[test]
    fn test_load_named_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[default]\nsubdomain = \"acme\"\n\n[staging]\nurl = \"https://staging.example.com\"\nformat = \"json\""
        )
        .unwrap();

        let staging = load_profile(file.path(), "staging").unwrap();
        assert_eq!(staging.url.as_deref(), Some("https://staging.example.com"));
        assert_eq!(staging.output_format(), Some(OutputFormat::Json));
        assert!(load_profile(file.path(), "missing").unwrap().url.is_none());
    }

    #[test]
    fn test_missing_profiles_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_profiles(&dir.path().join("config.toml")).unwrap().is_empty());
    }

    #[test]
    fn test_flags_override_environment_and_profile() {
        let profile = ProfileConfig {
            client_id: Some("profile-id".to_string()),
            client_secret: Some("profile-secret".to_string()),
            subdomain: Some("profile".to_string()),
            ..ProfileConfig::default()
        };
        let env = EnvSource::from_pairs([("ONELOGIN_CLIENT_ID", "env-id")]);
        let config = resolve_provider_config(
            &cli(&["--subdomain", "acme", "--timeout", "5", "resources"]),
            profile,
            env,
        )
        .unwrap();

        assert_eq!(config.client_id, "env-id");
        assert_eq!(config.client_secret.expose(), "profile-secret");
        assert_eq!(config.subdomain().as_deref(), Some("acme"));
        assert_eq!(config.timeout_secs, 5);
    }
}
