//! Provider configuration for the OneLogin provider.
//!
//! Configuration is assembled from several sources and merged by priority
//! (lowest to highest):
//!
//! 1. Defaults
//! 2. File config (`onelogin.toml`)
//! 3. Environment variables (`ONELOGIN_*`)
//! 4. Explicit values supplied by the caller
//!
//! The environment is always read through an injected lookup, so nothing in
//! this crate mutates or depends on the global process environment beyond
//! the opt-in [`EnvSource::from_process`].

pub mod merger;
pub mod provider;
pub mod secret;
pub mod sources;

pub use merger::{ConfigMerger, PartialConfig, Priority};
pub use provider::{DEFAULT_TIMEOUT_SECS, LoadOptions, ProviderConfig, load_config};
pub use secret::SecretString;
pub use sources::{EnvSource, FileSource};

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    MissingCredentials(String),

    #[error("{0}")]
    MissingEndpoint(String),
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
