//! The adapter boundary between resource controllers and the OneLogin API.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::collection::Collection;
use crate::error::ApiResult;

/// Loosely typed access to OneLogin resource collections.
///
/// Every controller goes through this trait, so the HTTP client and the
/// in-memory backend are interchangeable. Bodies and responses are plain JSON
/// and typed decoding happens on the provider side.
#[async_trait]
pub trait OneLoginApi: Send + Sync {
    /// Reads one object.
    ///
    /// Returns `None` if the object does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and non-404 error statuses.
    async fn get(&self, collection: &Collection, id: &str) -> ApiResult<Option<Value>>;

    /// Lists the objects of a collection matching every `(key, value)` query
    /// parameter. No match is an empty list.
    async fn list(
        &self,
        collection: &Collection,
        query: &[(String, String)],
    ) -> ApiResult<Vec<Value>>;

    /// Creates an object and returns it as stored, including its `id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::PartialSuccess` when the service reported a failure
    /// but still created the object.
    async fn create(&self, collection: &Collection, body: &Value) -> ApiResult<Value>;

    /// Updates an object and returns the response body.
    ///
    /// A response without an `id` (or `Value::Null`) means the object no
    /// longer exists on the service.
    async fn update(&self, collection: &Collection, id: &str, body: &Value) -> ApiResult<Value>;

    /// Deletes one object.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refused the deletion, including when
    /// the object is already gone.
    async fn delete(&self, collection: &Collection, id: &str) -> ApiResult<()>;

    /// Sends a DELETE with a JSON body to the collection itself, used by
    /// bulk-removal endpoints such as role users.
    async fn remove(&self, collection: &Collection, body: &Value) -> ApiResult<()>;
}

/// Type alias for a shareable API handle.
pub type DynApi = Arc<dyn OneLoginApi>;

/// Extracts an object identifier from a response body.
///
/// Identifiers arrive as integers, floats or strings depending on the
/// endpoint generation; all are rendered as a plain string.
pub fn extract_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().map(|f| format!("{}", f as i64)),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_id_variants() {
        assert_eq!(extract_id(&json!({"id": 12})).as_deref(), Some("12"));
        assert_eq!(extract_id(&json!({"id": 12.0})).as_deref(), Some("12"));
        assert_eq!(extract_id(&json!({"id": "abc-1"})).as_deref(), Some("abc-1"));
        assert_eq!(extract_id(&json!({"id": null})), None);
        assert_eq!(extract_id(&json!({"id": ""})), None);
        assert_eq!(extract_id(&json!({})), None);
        assert_eq!(extract_id(&Value::Null), None);
    }
}
