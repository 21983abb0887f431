//! `onelogin_app_role_attachments`: membership of a role in an app's
//! `role_ids`, managed by rewriting that list on the app.

use async_trait::async_trait;
use onelogin_client::{Collection, OneLoginApi};
use onelogin_core::{CoreError, ErrorCategory, ResourceKind, require_id};
use serde_json::{Value, json};

use crate::controller::{ResourceController, api_failure, prepare_config};
use crate::error::{ProviderError, Result};
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, Schema};

const KIND: ResourceKind = ResourceKind::AppRoleAttachments;

/// Identifier of an attachment: role ID followed by app ID
pub fn attachment_id(app_id: i32, role_id: i32) -> String {
    format!("{role_id}{app_id}")
}

fn app_role_ids(app: &Value) -> Vec<i32> {
    app.get("role_ids")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_i64().and_then(|n| i32::try_from(n).ok()))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct AppRoleAttachments;

impl AppRoleAttachments {
    pub fn new() -> Self {
        Self
    }

    /// Role IDs currently on the app, `None` if the app is gone.
    async fn role_ids(
        &self,
        api: &dyn OneLoginApi,
        app_id: i32,
        category: ErrorCategory,
        id: &str,
    ) -> Result<Option<Vec<i32>>> {
        match api.get(&Collection::Apps, &app_id.to_string()).await {
            Ok(app) => Ok(app.as_ref().map(app_role_ids)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(api_failure(KIND, category, "reading the app of", id, e)),
        }
    }

    async fn write_role_ids(
        &self,
        api: &dyn OneLoginApi,
        app_id: i32,
        role_ids: Vec<i32>,
        category: ErrorCategory,
        id: &str,
    ) -> Result<()> {
        api.update(
            &Collection::Apps,
            &app_id.to_string(),
            &json!({ "role_ids": role_ids }),
        )
        .await
        .map_err(|e| api_failure(KIND, category, "updating the app of", id, e))?;
        Ok(())
    }

    async fn attach(
        &self,
        api: &dyn OneLoginApi,
        app_id: i32,
        role_id: i32,
        category: ErrorCategory,
    ) -> Result<()> {
        let id = attachment_id(app_id, role_id);
        let Some(mut role_ids) = self.role_ids(api, app_id, category, &id).await? else {
            return Err(api_failure(
                KIND,
                category,
                "reading the app of",
                &id,
                onelogin_client::ApiError::not_found(Collection::Apps, &app_id.to_string()),
            ));
        };
        if !role_ids.contains(&role_id) {
            role_ids.push(role_id);
        }
        self.write_role_ids(api, app_id, role_ids, category, &id).await
    }

    /// Removes the role; an app that is already gone counts as detached.
    async fn detach(
        &self,
        api: &dyn OneLoginApi,
        app_id: i32,
        role_id: i32,
        category: ErrorCategory,
    ) -> Result<()> {
        let id = attachment_id(app_id, role_id);
        let Some(role_ids) = self.role_ids(api, app_id, category, &id).await? else {
            return Ok(());
        };
        let remaining: Vec<i32> = role_ids.into_iter().filter(|r| *r != role_id).collect();
        self.write_role_ids(api, app_id, remaining, category, &id).await
    }

    /// The pair recorded by the last read, falling back to configuration
    fn attached_pair(data: &ResourceData) -> Result<(i32, i32)> {
        let state = data.state();
        let app_id = match state.int32("app_id")? {
            Some(app_id) => app_id,
            None => data.config().require_int32("app_id")?,
        };
        let role_id = match state.int32("role_id")? {
            Some(role_id) => role_id,
            None => data.config().require_int32("role_id")?,
        };
        Ok((app_id, role_id))
    }
}

fn schema() -> Schema {
    Schema::new([
        Attribute::int("app_id").required().force_new(),
        Attribute::int("role_id").required(),
    ])
}

#[async_trait]
impl ResourceController for AppRoleAttachments {
    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn plan(&self, config: &Record) -> Result<Value> {
        let config = prepare_config(&schema(), config)?;
        Ok(json!({ "role_ids": [config.require_int32("role_id")?] }))
    }

    async fn create(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let config = prepare_config(&schema(), data.config())?;
        let app_id = config.require_int32("app_id")?;
        let role_id = config.require_int32("role_id")?;

        tracing::info!(resource_type = %KIND, app_id, role_id, "[CREATE] Attaching role to app");
        self.attach(api, app_id, role_id, ErrorCategory::Create).await?;
        data.set_id(attachment_id(app_id, role_id));
        tracing::info!(resource_type = %KIND, app_id, role_id, "[CREATED] Attached role to app");
        self.read(api, data).await
    }

    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let id = require_id(data.id())?.to_string();
        let (app_id, role_id) = Self::attached_pair(data)?;

        tracing::info!(resource_type = %KIND, id = %id, "[READ] Reading attachment");
        let Some(role_ids) = self.role_ids(api, app_id, ErrorCategory::Read, &id).await? else {
            tracing::info!(resource_type = %KIND, id = %id, "[NOT FOUND] App no longer exists");
            data.clear_id();
            return Ok(());
        };
        if !role_ids.contains(&role_id) {
            tracing::info!(
                resource_type = %KIND,
                id = %id,
                "[NOT FOUND] App {app_id} does not have role {role_id}"
            );
            data.clear_id();
            return Ok(());
        }

        data.set_state(
            Record::new()
                .with("app_id", app_id)
                .with("role_id", role_id),
        );
        Ok(())
    }

    /// Moves the attachment from the recorded pair to the configured one.
    async fn update(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let id = require_id(data.id())?.to_string();
        let config = prepare_config(&schema(), data.config())?;
        let (old_app, old_role) = Self::attached_pair(data)?;
        let app_id = config.require_int32("app_id")?;
        let role_id = config.require_int32("role_id")?;

        tracing::info!(resource_type = %KIND, id = %id, "[UPDATE] Moving attachment");
        self.detach(api, old_app, old_role, ErrorCategory::Update).await?;
        self.attach(api, app_id, role_id, ErrorCategory::Update).await?;
        data.set_state(Record::new());
        data.set_id(attachment_id(app_id, role_id));
        tracing::info!(resource_type = %KIND, app_id, role_id, "[UPDATED] Moved attachment");
        self.read(api, data).await
    }

    async fn delete(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Err(CoreError::EmptyId.into());
        };
        let (app_id, role_id) = Self::attached_pair(data)?;

        tracing::info!(resource_type = %KIND, id = %id, "[DELETE] Detaching role from app");
        self.detach(api, app_id, role_id, ErrorCategory::Delete).await?;
        tracing::info!(resource_type = %KIND, id = %id, "[DELETED] Detached role from app");
        data.clear_id();
        Ok(())
    }

    /// Attachments carry no remote identity of their own.
    async fn import(&self, _api: &dyn OneLoginApi, import_id: &str) -> Result<ResourceData> {
        Err(ProviderError::Unsupported(format!(
            "{} cannot be imported (got {import_id}); declare the attachment instead",
            KIND.type_name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onelogin_client::MemoryApi;

    fn config(app_id: i32, role_id: i32) -> Record {
        Record::new().with("app_id", app_id).with("role_id", role_id)
    }

    fn api_with_app() -> MemoryApi {
        let api = MemoryApi::new();
        api.insert(&Collection::Apps, "10", json!({"name": "wiki", "role_ids": [1]}));
        api.insert(&Collection::Apps, "11", json!({"name": "mail", "role_ids": []}));
        api
    }

    #[test]
    fn test_attachment_id() {
        assert_eq!(attachment_id(10, 7), "710");
    }

    #[tokio::test]
    async fn test_attach_and_detach() {
        let api = api_with_app();
        let controller = AppRoleAttachments::new();
        let mut data = ResourceData::new(config(10, 7));

        controller.create(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), Some("710"));
        assert_eq!(api.stored(&Collection::Apps, "10").unwrap()["role_ids"], json!([1, 7]));

        controller.delete(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
        assert_eq!(api.stored(&Collection::Apps, "10").unwrap()["role_ids"], json!([1]));
    }

    #[tokio::test]
    async fn test_read_clears_detached_role() {
        let api = api_with_app();
        let mut data = ResourceData::new(config(10, 7)).with_id("710");
        AppRoleAttachments::new().read(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn test_read_clears_missing_app() {
        let api = MemoryApi::new();
        let mut data = ResourceData::new(config(10, 7)).with_id("710");
        AppRoleAttachments::new().read(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn test_update_moves_attachment() {
        let api = api_with_app();
        let controller = AppRoleAttachments::new();
        let mut data = ResourceData::new(config(10, 7));
        controller.create(&api, &mut data).await.unwrap();

        data.set_config(config(11, 7));
        controller.update(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), Some("711"));
        assert_eq!(api.stored(&Collection::Apps, "10").unwrap()["role_ids"], json!([1]));
        assert_eq!(api.stored(&Collection::Apps, "11").unwrap()["role_ids"], json!([7]));
    }
}
