// Resource identifiers are strings in state and integers on most API paths.
use crate::error::{CoreError, Result};

/// Parses a numeric resource ID.
pub fn parse_id(id: &str) -> Result<i32> {
    if id.is_empty() {
        return Err(CoreError::EmptyId);
    }
    id.trim()
        .parse::<i32>()
        .map_err(|e| CoreError::invalid_id(id, e))
}

/// Parses a numeric resource ID, ignoring failures.
///
/// Inflators attach an `id` to the request only when it parses; anything else
/// is dropped without an error.
pub fn parse_id_lenient(id: &str) -> Option<i32> {
    match parse_id(id) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(id, error = %e, "ignoring unparseable resource ID");
            None
        }
    }
}

/// Returns the ID or [`CoreError::EmptyId`].
pub fn require_id(id: Option<&str>) -> Result<&str> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(CoreError::EmptyId),
    }
}

/// Splits an import ID of the form `<parent_id>/<child_id>`.
pub fn parse_nested_import_id(id: &str) -> Result<(String, String)> {
    let mut parts = id.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(parent), Some(child), None) if !parent.is_empty() && !child.is_empty() => {
            Ok((parent.to_string(), child.to_string()))
        }
        _ => Err(CoreError::invalid_import_id(id)),
    }
}
