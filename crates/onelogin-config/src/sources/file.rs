//! File-based configuration source

use std::path::PathBuf;

use tracing::debug;

use crate::Result;
use crate::merger::PartialConfig;

pub const DEFAULT_CONFIG_FILE: &str = "onelogin.toml";

/// Reads a TOML file with the provider fields at the top level
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl Default for FileSource {
    fn default() -> Self {
        Self::from_path(DEFAULT_CONFIG_FILE)
    }
}

impl FileSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read and parse the configuration file
    pub fn read(&self) -> Result<PartialConfig> {
        if !self.path.exists() {
            debug!("Config file does not exist: {:?}", self.path);
            return Ok(PartialConfig::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let partial = PartialConfig::from_toml(&contents)?;
        debug!(path = ?self.path, fields = ?partial.fields(), "read config file");
        Ok(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let source = FileSource::from_path("/nonexistent/onelogin.toml");
        assert!(source.read().unwrap().is_empty());
    }

    #[test]
    fn test_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onelogin.toml");
        std::fs::write(&path, "url = \"https://acme.onelogin.com\"\n").unwrap();

        let partial = FileSource::from_path(&path).read().unwrap();
        assert_eq!(partial.url.as_deref(), Some("https://acme.onelogin.com"));
    }
}
