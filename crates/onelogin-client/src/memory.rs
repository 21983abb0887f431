//! In-memory OneLogin backend.
//!
//! Behaves like the service for the operations controllers use: it assigns
//! identifiers, merges updates, keeps role users and self-registration fields
//! attached to their parents, and can be told to fail the next call of a
//! given kind.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value, json};

use crate::api::OneLoginApi;
use crate::collection::Collection;
use crate::error::{ApiError, ApiResult};

/// API calls that can have failures injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    Get,
    List,
    Create,
    Update,
    Delete,
    Remove,
}

type StorageKey = String; // Format: "collection-path/id"

fn make_key(collection: &Collection, id: &str) -> StorageKey {
    format!("{}/{id}", collection.path())
}

#[derive(Debug)]
pub struct MemoryApi {
    data: DashMap<StorageKey, Value>,
    next_id: AtomicI64,
    failures: Mutex<HashMap<(MemoryOp, String), ApiError>>,
    calls: Mutex<Vec<(MemoryOp, String)>>,
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryApi {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            next_id: AtomicI64::new(1000),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Stores an object directly, bypassing create.
    pub fn insert(&self, collection: &Collection, id: &str, mut value: Value) {
        if let Value::Object(map) = &mut value {
            map.entry("id").or_insert_with(|| id_value(collection, id));
        }
        self.data.insert(make_key(collection, id), value);
    }

    /// Returns the stored object, if any.
    pub fn stored(&self, collection: &Collection, id: &str) -> Option<Value> {
        self.data
            .get(&make_key(collection, id))
            .map(|entry| entry.value().clone())
    }

    /// Number of stored objects in a collection
    pub fn count(&self, collection: &Collection) -> usize {
        let prefix = format!("{}/", collection.path());
        self.data
            .iter()
            .filter(|entry| {
                entry
                    .key()
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/'))
            })
            .count()
    }

    /// Makes the next `op` on `collection` fail with `error`.
    pub fn fail_next(&self, op: MemoryOp, collection: &Collection, error: ApiError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((op, collection.path()), error);
    }

    /// Calls made so far, as (operation, collection path)
    pub fn calls(&self) -> Vec<(MemoryOp, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, op: MemoryOp, collection: &Collection) -> ApiResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((op, collection.path()));
        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(op, collection.path()))
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self, collection: &Collection) -> String {
        if collection.has_string_ids() {
            uuid::Uuid::new_v4().to_string()
        } else {
            self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
        }
    }

    fn role_users(&self, role_id: &str) -> ApiResult<Vec<i64>> {
        let role = self
            .stored(&Collection::Roles, role_id)
            .ok_or_else(|| ApiError::not_found(Collection::Roles, role_id))?;
        Ok(int_list(role.get("users")))
    }

    fn set_role_users(&self, role_id: &str, users: Vec<i64>) {
        if let Some(mut role) = self.data.get_mut(&make_key(&Collection::Roles, role_id))
            && let Value::Object(map) = role.value_mut()
        {
            map.insert("users".to_string(), json!(users));
        }
    }

    fn sync_profile_fields(&self, profile_id: &str) {
        let fields_collection = Collection::SelfRegistrationProfileFields {
            profile_id: profile_id.to_string(),
        };
        let prefix = format!("{}/", fields_collection.path());
        let mut fields: Vec<Value> = self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.value().clone())
            .collect();
        fields.sort_by_key(|f| f.get("id").and_then(Value::as_i64));

        if let Some(mut profile) = self
            .data
            .get_mut(&make_key(&Collection::SelfRegistrationProfiles, profile_id))
            && let Value::Object(map) = profile.value_mut()
        {
            map.insert("fields".to_string(), Value::Array(fields));
        }
    }
}

fn id_value(collection: &Collection, id: &str) -> Value {
    match id.parse::<i64>() {
        Ok(n) if !collection.has_string_ids() => json!(n),
        _ => json!(id),
    }
}

fn int_list(value: Option<&Value>) -> Vec<i64> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

/// Renders a stored field the way it travels as a query parameter.
fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `user_ids` is a comma separated ID list; other keys match a field exactly.
fn matches_query(object: &Value, query: &[(String, String)]) -> bool {
    query.iter().all(|(key, expected)| {
        if key == "user_ids" {
            let id = object.get("id").and_then(query_value);
            return expected
                .split(',')
                .any(|wanted| id.as_deref() == Some(wanted.trim()));
        }
        object.get(key).and_then(query_value).as_deref() == Some(expected.as_str())
    })
}

fn merge_object(target: &mut Map<String, Value>, patch: &Value) {
    if let Value::Object(patch) = patch {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl OneLoginApi for MemoryApi {
    async fn get(&self, collection: &Collection, id: &str) -> ApiResult<Option<Value>> {
        self.record(MemoryOp::Get, collection)?;
        Ok(self.stored(collection, id))
    }

    async fn list(
        &self,
        collection: &Collection,
        query: &[(String, String)],
    ) -> ApiResult<Vec<Value>> {
        self.record(MemoryOp::List, collection)?;
        let prefix = format!("{}/", collection.path());
        let mut items: Vec<Value> = self
            .data
            .iter()
            .filter(|entry| {
                entry
                    .key()
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/'))
            })
            .map(|entry| entry.value().clone())
            .filter(|item| matches_query(item, query))
            .collect();
        items.sort_by_key(|item| item.get("id").and_then(query_value));
        Ok(items)
    }

    async fn create(&self, collection: &Collection, body: &Value) -> ApiResult<Value> {
        self.record(MemoryOp::Create, collection)?;

        if let Collection::RoleUsers { role_id } = collection {
            let mut users = self.role_users(role_id)?;
            for user in int_list(Some(body)) {
                if !users.contains(&user) {
                    users.push(user);
                }
            }
            self.set_role_users(role_id, users.clone());
            return Ok(json!(users));
        }

        let id = self.next_id(collection);
        let mut stored = Map::new();
        merge_object(&mut stored, body);
        stored.insert("id".to_string(), id_value(collection, &id));
        let stored = Value::Object(stored);
        self.data.insert(make_key(collection, &id), stored.clone());

        if let Collection::SelfRegistrationProfileFields { profile_id } = collection {
            self.sync_profile_fields(profile_id);
        }
        tracing::trace!(collection = %collection, id, "memory create");
        Ok(stored)
    }

    async fn update(&self, collection: &Collection, id: &str, body: &Value) -> ApiResult<Value> {
        self.record(MemoryOp::Update, collection)?;
        let Some(mut entry) = self.data.get_mut(&make_key(collection, id)) else {
            return Ok(Value::Null);
        };
        if let Value::Object(map) = entry.value_mut() {
            merge_object(map, body);
        }
        Ok(entry.value().clone())
    }

    async fn delete(&self, collection: &Collection, id: &str) -> ApiResult<()> {
        self.record(MemoryOp::Delete, collection)?;
        if self.data.remove(&make_key(collection, id)).is_none() {
            return Err(ApiError::not_found(collection, id));
        }
        if let Collection::SelfRegistrationProfileFields { profile_id } = collection {
            self.sync_profile_fields(profile_id);
        }
        Ok(())
    }

    async fn remove(&self, collection: &Collection, body: &Value) -> ApiResult<()> {
        self.record(MemoryOp::Remove, collection)?;
        match collection {
            Collection::RoleUsers { role_id } => {
                let removed = int_list(Some(body));
                let users = self
                    .role_users(role_id)?
                    .into_iter()
                    .filter(|u| !removed.contains(u))
                    .collect();
                self.set_role_users(role_id, users);
                Ok(())
            }
            other => Err(ApiError::status(
                405,
                format!("bulk removal is not supported on {other}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::extract_id;

    #[tokio::test]
    async fn test_create_assigns_numeric_ids() {
        let api = MemoryApi::new();
        let created = api
            .create(&Collection::Roles, &json!({"name": "admins"}))
            .await
            .unwrap();
        let id = extract_id(&created).unwrap();
        assert!(id.parse::<i64>().is_ok());
        assert_eq!(
            api.get(&Collection::Roles, &id).await.unwrap().unwrap()["name"],
            "admins"
        );
        assert_eq!(api.count(&Collection::Roles), 1);
    }

    #[tokio::test]
    async fn test_string_ids_for_hooks() {
        let api = MemoryApi::new();
        let created = api
            .create(&Collection::SmartHooks, &json!({"type": "pre-authentication"}))
            .await
            .unwrap();
        assert!(created["id"].is_string());
    }

    #[tokio::test]
    async fn test_list_filters_direct_children() {
        let api = MemoryApi::new();
        api.insert(&Collection::Users, "1", json!({"username": "ann", "directory_id": 4}));
        api.insert(&Collection::Users, "2", json!({"username": "bob", "directory_id": 4}));
        api.insert(&Collection::Users, "3", json!({"username": "cat"}));
        api.insert(&Collection::UserCustomAttributes, "9", json!({"name": "team"}));

        let all = api.list(&Collection::Users, &[]).await.unwrap();
        assert_eq!(all.len(), 3);

        let query = [("directory_id".to_string(), "4".to_string())];
        let found = api.list(&Collection::Users, &query).await.unwrap();
        let names: Vec<_> = found.iter().map(|u| u["username"].clone()).collect();
        assert_eq!(names, vec![json!("ann"), json!("bob")]);

        let query = [("user_ids".to_string(), "3, 1".to_string())];
        assert_eq!(api.list(&Collection::Users, &query).await.unwrap().len(), 2);

        let query = [("username".to_string(), "zed".to_string())];
        assert!(api.list(&Collection::Users, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_returns_null() {
        let api = MemoryApi::new();
        let resp = api
            .update(&Collection::Users, "1", &json!({"email": "x"}))
            .await
            .unwrap();
        assert_eq!(resp, Value::Null);
    }

    #[tokio::test]
    async fn test_failure_injection_is_one_shot() {
        let api = MemoryApi::new();
        api.fail_next(
            MemoryOp::Delete,
            &Collection::Users,
            ApiError::status(500, "boom"),
        );
        api.insert(&Collection::Users, "5", json!({"username": "a"}));

        assert!(api.delete(&Collection::Users, "5").await.is_err());
        assert!(api.delete(&Collection::Users, "5").await.is_ok());
        assert!(api.delete(&Collection::Users, "5").await.is_err());
    }

    #[tokio::test]
    async fn test_role_users_add_and_remove() {
        let api = MemoryApi::new();
        api.insert(&Collection::Roles, "7", json!({"name": "r", "users": [1]}));
        let role_users = Collection::RoleUsers {
            role_id: "7".to_string(),
        };
        api.create(&role_users, &json!([2, 3])).await.unwrap();
        assert_eq!(
            api.stored(&Collection::Roles, "7").unwrap()["users"],
            json!([1, 2, 3])
        );
        api.remove(&role_users, &json!([1, 3])).await.unwrap();
        assert_eq!(
            api.stored(&Collection::Roles, "7").unwrap()["users"],
            json!([2])
        );
    }

    #[tokio::test]
    async fn test_profile_fields_follow_parent() {
        let api = MemoryApi::new();
        api.insert(
            &Collection::SelfRegistrationProfiles,
            "3",
            json!({"name": "p"}),
        );
        let fields = Collection::SelfRegistrationProfileFields {
            profile_id: "3".to_string(),
        };
        let field = api
            .create(&fields, &json!({"custom_attribute_id": 44}))
            .await
            .unwrap();
        let profile = api
            .stored(&Collection::SelfRegistrationProfiles, "3")
            .unwrap();
        assert_eq!(profile["fields"][0]["custom_attribute_id"], 44);
        // nested records do not count toward the parent collection
        assert_eq!(api.count(&Collection::SelfRegistrationProfiles), 1);

        api.delete(&fields, &extract_id(&field).unwrap())
            .await
            .unwrap();
        let profile = api
            .stored(&Collection::SelfRegistrationProfiles, "3")
            .unwrap();
        assert_eq!(profile["fields"], json!([]));
    }
}
