//! `onelogin_user_role_attachments`: the user set of a role, managed through
//! the role's `users` sub-collection. The resource ID is the role ID.

use async_trait::async_trait;
use onelogin_client::{Collection, OneLoginApi};
use onelogin_core::{CoreError, ErrorCategory, ResourceKind, parse_id, require_id};
use serde_json::{Value, json};

use crate::controller::{ResourceController, api_failure, prepare_config};
use crate::error::Result;
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};

const KIND: ResourceKind = ResourceKind::UserRoleAttachments;

fn schema() -> Schema {
    Schema::new([
        Attribute::int("role_id").required().force_new(),
        Attribute::set("users", AttributeType::Int).required(),
    ])
}

fn role_users(role_id: &str) -> Collection {
    Collection::RoleUsers {
        role_id: role_id.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct UserRoleAttachments;

impl UserRoleAttachments {
    pub fn new() -> Self {
        Self
    }

    async fn add_users(
        &self,
        api: &dyn OneLoginApi,
        role_id: &str,
        users: &[i32],
        category: ErrorCategory,
    ) -> Result<()> {
        if users.is_empty() {
            return Ok(());
        }
        api.create(&role_users(role_id), &json!(users))
            .await
            .map_err(|e| api_failure(KIND, category, "adding users to", role_id, e))?;
        Ok(())
    }

    async fn remove_users(
        &self,
        api: &dyn OneLoginApi,
        role_id: &str,
        users: &[i32],
        category: ErrorCategory,
    ) -> Result<()> {
        if users.is_empty() {
            return Ok(());
        }
        api.remove(&role_users(role_id), &json!(users))
            .await
            .map_err(|e| api_failure(KIND, category, "removing users from", role_id, e))
    }
}

#[async_trait]
impl ResourceController for UserRoleAttachments {
    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn plan(&self, config: &Record) -> Result<Value> {
        let config = prepare_config(&schema(), config)?;
        Ok(json!(config.int_list("users")?.unwrap_or_default()))
    }

    async fn create(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let config = prepare_config(&schema(), data.config())?;
        let role_id = config.require_int32("role_id")?.to_string();
        let users = config.int_list("users")?.unwrap_or_default();

        tracing::info!(resource_type = %KIND, id = %role_id, "[CREATE] Adding users to role");
        self.add_users(api, &role_id, &users, ErrorCategory::Create).await?;
        data.set_id(role_id.clone());
        tracing::info!(resource_type = %KIND, id = %role_id, "[CREATED] Added users to role");
        self.read(api, data).await
    }

    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let id = require_id(data.id())?.to_string();

        tracing::info!(resource_type = %KIND, id = %id, "[READ] Reading role users");
        let role = match api.get(&Collection::Roles, &id).await {
            Ok(role) => role,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(api_failure(KIND, ErrorCategory::Read, "reading", &id, e)),
        };
        let Some(role) = role else {
            tracing::info!(resource_type = %KIND, id = %id, "[NOT FOUND] Role no longer exists");
            data.clear_id();
            return Ok(());
        };

        let users: Vec<i32> = role
            .get("users")
            .and_then(Value::as_array)
            .map(|users| {
                users
                    .iter()
                    .filter_map(|u| u.as_i64().and_then(|n| i32::try_from(n).ok()))
                    .collect()
            })
            .unwrap_or_default();
        data.set_state(
            Record::new()
                .with("role_id", parse_id(&id)?)
                .with("users", users),
        );
        Ok(())
    }

    /// Replaces the recorded user set with the configured one.
    async fn update(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let id = require_id(data.id())?.to_string();
        let config = prepare_config(&schema(), data.config())?;
        let old_users = data.state().int_list("users")?.unwrap_or_default();
        let new_users = config.int_list("users")?.unwrap_or_default();

        tracing::info!(resource_type = %KIND, id = %id, "[UPDATE] Replacing role users");
        self.remove_users(api, &id, &old_users, ErrorCategory::Update).await?;
        self.add_users(api, &id, &new_users, ErrorCategory::Update).await?;
        tracing::info!(resource_type = %KIND, id = %id, "[UPDATED] Replaced role users");
        self.read(api, data).await
    }

    async fn delete(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Err(CoreError::EmptyId.into());
        };
        let users = match data.state().int_list("users")? {
            Some(users) => users,
            None => data.config().int_list("users")?.unwrap_or_default(),
        };

        tracing::info!(resource_type = %KIND, id = %id, "[DELETE] Removing users from role");
        self.remove_users(api, &id, &users, ErrorCategory::Delete).await?;
        tracing::info!(resource_type = %KIND, id = %id, "[DELETED] Removed users from role");
        data.clear_id();
        Ok(())
    }

    async fn import(&self, api: &dyn OneLoginApi, import_id: &str) -> Result<ResourceData> {
        parse_id(import_id)?;
        tracing::info!(resource_type = %KIND, import_id, "[IMPORT] Importing resource");
        let mut data = ResourceData::default().with_id(import_id);
        self.read(api, &mut data).await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onelogin_client::MemoryApi;

    fn config(users: &[i32]) -> Record {
        Record::new().with("role_id", 7).with("users", json!(users))
    }

    fn api_with_role() -> MemoryApi {
        let api = MemoryApi::new();
        api.insert(&Collection::Roles, "7", json!({"name": "admins", "users": [1]}));
        api
    }

    #[tokio::test]
    async fn test_create_adds_users() {
        let api = api_with_role();
        let mut data = ResourceData::new(config(&[2, 3]));
        UserRoleAttachments::new().create(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), Some("7"));
        assert_eq!(data.state().int_list("users").unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_update_replaces_users() {
        let api = api_with_role();
        let controller = UserRoleAttachments::new();
        let mut data = ResourceData::new(config(&[1, 2]));
        controller.create(&api, &mut data).await.unwrap();

        data.set_config(config(&[3]));
        controller.update(&api, &mut data).await.unwrap();
        assert_eq!(api.stored(&Collection::Roles, "7").unwrap()["users"], json!([3]));
    }

    #[tokio::test]
    async fn test_missing_role_clears_id() {
        let api = MemoryApi::new();
        let mut data = ResourceData::new(config(&[1])).with_id("7");
        UserRoleAttachments::new().read(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn test_delete_removes_users() {
        let api = api_with_role();
        let controller = UserRoleAttachments::new();
        let mut data = ResourceData::new(config(&[2]));
        controller.create(&api, &mut data).await.unwrap();
        controller.delete(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
        assert_eq!(api.stored(&Collection::Roles, "7").unwrap()["users"], json!([]));
    }
}
