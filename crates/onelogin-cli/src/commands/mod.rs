pub mod crud;
pub mod data;
pub mod resources;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use onelogin_provider::Record;

/// Reads a JSON configuration from a file, or from stdin when no path is given.
pub fn read_config(file: Option<&Path>) -> Result<Record> {
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    parse_config(&content)
}

/// Like [`read_config`], but an absent file means an empty configuration.
pub fn read_optional_config(file: Option<&Path>) -> Result<Record> {
    match file {
        Some(_) => read_config(file),
        None => Ok(Record::new()),
    }
}

fn parse_config(content: &str) -> Result<Record> {
    let value: serde_json::Value = serde_json::from_str(content).context("Invalid JSON")?;
    Record::from_value(value).context("Configuration must be a JSON object")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "admins", "users": [1, 2]}}"#).unwrap();
        let config = read_config(Some(file.path())).unwrap();
        assert_eq!(config.string("name").unwrap().as_deref(), Some("admins"));
        assert_eq!(config.int_list("users").unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn test_config_must_be_an_object() {
        assert!(parse_config("[1, 2]").is_err());
        assert!(parse_config("{").is_err());
        assert!(read_optional_config(None).unwrap().is_empty());
    }
}
