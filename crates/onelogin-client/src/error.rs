use onelogin_config::ConfigError;
use onelogin_core::is_not_found_message;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by a [`OneLoginApi`](crate::OneLoginApi) implementation
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("status: {status}, body: {body}")]
    Status { status: u16, body: String },

    /// The request failed but the service still created the primary object.
    /// `resource` is the object as returned, including its `id`.
    #[error("{message}")]
    PartialSuccess { resource: Value, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ApiError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn not_found(collection: impl std::fmt::Display, id: &str) -> Self {
        Self::status(404, format!("{collection}/{id} not found"))
    }

    pub fn partial_success(resource: Value, message: impl Into<String>) -> Self {
        Self::PartialSuccess {
            resource,
            message: message.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Check if this error means the remote object does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status: 404, .. } => true,
            Self::PartialSuccess { .. } | Self::Config(_) => false,
            other => is_not_found_message(&other.to_string()),
        }
    }

    /// The object the service created despite the error, if any
    pub fn partial_resource(&self) -> Option<&Value> {
        match self {
            Self::PartialSuccess { resource, .. } => Some(resource),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_message_format() {
        let err = ApiError::status(500, "boom");
        assert_eq!(err.to_string(), "status: 500, body: boom");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(ApiError::status(404, "").is_not_found());
        assert!(ApiError::not_found("api/2/users", "12").is_not_found());
        assert!(ApiError::status(400, "App does not exist").is_not_found());
        assert!(!ApiError::status(400, "bad request").is_not_found());
    }

    #[test]
    fn test_partial_resource() {
        let err = ApiError::partial_success(json!({"id": 9}), "role assignment failed");
        assert_eq!(err.partial_resource(), Some(&json!({"id": 9})));
        assert!(!err.is_not_found());
        assert!(ApiError::status(500, "").partial_resource().is_none());
    }
}
