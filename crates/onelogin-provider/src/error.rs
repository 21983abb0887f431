use onelogin_client::ApiError;
use onelogin_core::{CoreError, ErrorCategory, format_error};
use thiserror::Error;

use crate::record::DecodeError;
use crate::schema::ValidationError;

/// Errors surfaced by resource controllers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid configuration: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("malformed {block} block: {message}")]
    MalformedBlock { block: String, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A remote call failed; the API error text is kept verbatim as the cause.
    #[error("{}", api_message(.category, .resource_type, .operation, .id, .source))]
    Api {
        category: ErrorCategory,
        resource_type: String,
        operation: String,
        id: String,
        #[source]
        source: ApiError,
    },

    /// The remote object exists but a later step failed.
    #[error("[{category}] {resource_type} (ID: {id}) was only partially applied: {message}")]
    PartialSuccess {
        category: ErrorCategory,
        resource_type: String,
        id: String,
        message: String,
    },

    #[error("{0}")]
    Unsupported(String),

    #[error("could not decode API response: {0}")]
    Response(String),
}

fn api_message(
    category: &ErrorCategory,
    resource_type: &str,
    operation: &str,
    id: &str,
    source: &ApiError,
) -> String {
    format_error(*category, resource_type, operation, id, source)
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ProviderError {
    pub fn malformed_block(block: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedBlock {
            block: block.into(),
            message: message.into(),
        }
    }

    pub fn api(
        category: ErrorCategory,
        resource_type: impl Into<String>,
        operation: impl Into<String>,
        id: impl Into<String>,
        source: ApiError,
    ) -> Self {
        Self::Api {
            category,
            resource_type: resource_type.into(),
            operation: operation.into(),
            id: id.into(),
            source,
        }
    }

    pub fn partial_success(
        category: ErrorCategory,
        resource_type: impl Into<String>,
        id: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::PartialSuccess {
            category,
            resource_type: resource_type.into(),
            id: id.into(),
            message: message.to_string(),
        }
    }

    pub fn response(message: impl ToString) -> Self {
        Self::Response(message.to_string())
    }

    /// Configuration problems detected before any remote call
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::Validation(_) | Self::MalformedBlock { .. }
        ) || matches!(self, Self::Core(e) if e.is_user_error())
    }

    pub fn is_partial_success(&self) -> bool {
        matches!(self, Self::PartialSuccess { .. })
    }

    /// Lifecycle operation the error belongs to, when known
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api { category, .. } | Self::PartialSuccess { category, .. } => *category,
            Self::Core(CoreError::InvalidImportId { .. }) => ErrorCategory::Import,
            _ => ErrorCategory::Unknown,
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Core(CoreError::JsonError(err))
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
