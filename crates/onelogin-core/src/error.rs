use std::fmt;

use thiserror::Error;

/// Core error types for OneLogin provider operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to parse ID {id}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("ID is empty")]
    EmptyId,

    #[error("invalid import ID {id}: expected format <parent_id>/<child_id>")]
    InvalidImportId { id: String },

    #[error("{field} must be one of {allowed}, got: {value}")]
    InvalidEnumValue {
        field: String,
        allowed: String,
        value: String,
    },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Unknown data source: {0}")]
    UnknownDataSource(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidId error
    pub fn invalid_id(id: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidId {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new InvalidImportId error
    pub fn invalid_import_id(id: impl Into<String>) -> Self {
        Self::InvalidImportId { id: id.into() }
    }

    /// Create a new UnknownResourceType error
    pub fn unknown_resource_type(name: impl Into<String>) -> Self {
        Self::UnknownResourceType(name.into())
    }

    pub fn unknown_data_source(name: impl Into<String>) -> Self {
        Self::UnknownDataSource(name.into())
    }

    /// Check if this error was caused by user input rather than the system
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::JsonError(_))
    }
}

/// The lifecycle operation an error belongs to.
///
/// Rendered in upper case inside the bracketed prefix of formatted errors,
/// e.g. `[CREATE] Error calling API onelogin_roles (ID: 12): ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Create,
    Read,
    Update,
    Delete,
    Import,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Read => write!(f, "READ"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Import => write!(f, "IMPORT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Builds the standard error annotation shown to users.
pub fn format_error(
    category: ErrorCategory,
    resource_type: &str,
    operation: &str,
    id: &str,
    err: &dyn fmt::Display,
) -> String {
    format!("[{category}] Error {operation} {resource_type} (ID: {id}): {err}")
}

/// Classifies an error message as a "not found" condition.
///
/// Remote services report missing objects in several textual shapes, so the
/// check is done on the lower-cased message.
pub fn is_not_found_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("status: 404")
        || message.contains("not found")
        || message.contains("does not exist")
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_error() {
        let err = CoreError::invalid_id("abc", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "failed to parse ID abc: invalid digit found in string"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_enum_error_message() {
        let err = CoreError::InvalidEnumValue {
            field: "match".to_string(),
            allowed: "[all any]".to_string(),
            value: "some".to_string(),
        };
        assert_eq!(err.to_string(), "match must be one of [all any], got: some");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Create.to_string(), "CREATE");
        assert_eq!(ErrorCategory::Import.to_string(), "IMPORT");
        assert_eq!(ErrorCategory::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_format_error() {
        let msg = format_error(
            ErrorCategory::Delete,
            "onelogin_roles",
            "calling API",
            "42",
            &"status: 500, body: boom",
        );
        assert_eq!(
            msg,
            "[DELETE] Error calling API onelogin_roles (ID: 42): status: 500, body: boom"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(is_not_found_message("status: 404, body: {}"));
        assert!(is_not_found_message("User Not Found"));
        assert!(is_not_found_message("the app does not exist"));
        assert!(!is_not_found_message("status: 500, body: internal"));
    }
}
