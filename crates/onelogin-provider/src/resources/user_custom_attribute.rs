//! `onelogin_user_custom_attributes`
//!
//! Works in two modes chosen by `user_id`:
//!
//! - with `user_id`, the resource is one user's value for a custom attribute,
//!   stored in the user's `custom_attributes` map and identified as
//!   `<user_id>_<shortname>`;
//! - without it, the resource is the account-wide attribute definition.

use async_trait::async_trait;
use onelogin_client::{ApiError, Collection, OneLoginApi, extract_id};
use onelogin_core::{CoreError, ErrorCategory, ResourceKind, Setting, require_id};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::controller::{
    Controller, ResourceController, ResourceMapping, api_failure, prepare_config,
};
use crate::error::{ProviderError, Result};
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, Schema, ValidationError};
use crate::wire;

const KIND: ResourceKind = ResourceKind::UserCustomAttributes;

/// Key the definition endpoints wrap their payload under
const WRAPPER: &str = "user_field";

fn schema() -> Schema {
    Schema::new([
        Attribute::string("name").required(),
        Attribute::string("shortname").required(),
        Attribute::int("position"),
        Attribute::int("user_id").description("Set the value for this user only"),
        Attribute::string("value"),
    ])
}

/// Splits a user-value ID at its first underscore.
fn split_value_id(id: &str) -> Option<(i32, &str)> {
    let (user_id, shortname) = id.split_once('_')?;
    Some((user_id.parse().ok()?, shortname))
}

fn unwrap(body: &Value) -> &Value {
    match body.get(WRAPPER) {
        Some(inner) if inner.is_object() => inner,
        _ => body,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub shortname: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub position: Setting<i32>,
}

/// Account-wide attribute definitions
pub struct AttributeDefinitions;

impl ResourceMapping for AttributeDefinitions {
    type Model = AttributeDefinition;

    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::UserCustomAttributes)
    }

    fn inflate(&self, config: &Record) -> Result<AttributeDefinition> {
        Ok(AttributeDefinition {
            id: Setting::Unset,
            name: config.string("name")?.into(),
            shortname: config.string("shortname")?.into(),
            position: config.int32("position")?.into(),
        })
    }

    fn flatten(&self, definition: &AttributeDefinition) -> Record {
        let mut out = Record::new();
        out.set("name", &definition.name);
        out.set("shortname", &definition.shortname);
        out.set("position", &definition.position);
        out
    }

    fn encode(&self, definition: &AttributeDefinition) -> Result<Value> {
        Ok(json!({ WRAPPER: serde_json::to_value(definition)? }))
    }

    fn decode(&self, body: Value) -> Result<AttributeDefinition> {
        serde_json::from_value(unwrap(&body).clone()).map_err(ProviderError::response)
    }

    fn response_id(&self, body: &Value) -> Option<String> {
        extract_id(unwrap(body)).or_else(|| extract_id(body))
    }
}

pub struct UserCustomAttributes {
    definitions: Controller<AttributeDefinitions>,
}

impl Default for UserCustomAttributes {
    fn default() -> Self {
        Self::new()
    }
}

impl UserCustomAttributes {
    pub fn new() -> Self {
        Self {
            definitions: Controller::new(AttributeDefinitions),
        }
    }

    /// The user's custom attributes, or `None` if the user is gone.
    async fn user_attributes(
        &self,
        api: &dyn OneLoginApi,
        user_id: i32,
        category: ErrorCategory,
        id: &str,
    ) -> Result<Option<Map<String, Value>>> {
        let body = match api.get(&Collection::Users, &user_id.to_string()).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(api_failure(KIND, category, "reading the user of", id, e)),
        };
        Ok(body.map(|user| {
            user.get("custom_attributes")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default()
        }))
    }

    async fn write_value(
        &self,
        api: &dyn OneLoginApi,
        user_id: i32,
        shortname: &str,
        value: Value,
        category: ErrorCategory,
        id: &str,
    ) -> Result<()> {
        let mut attributes = self
            .user_attributes(api, user_id, category, id)
            .await?
            .ok_or_else(|| {
                api_failure(
                    KIND,
                    category,
                    "reading the user of",
                    id,
                    ApiError::not_found(Collection::Users, &user_id.to_string()),
                )
            })?;
        attributes.insert(shortname.to_string(), value);
        api.update(
            &Collection::Users,
            &user_id.to_string(),
            &json!({ "custom_attributes": attributes }),
        )
        .await
        .map_err(|e| api_failure(KIND, category, "updating the user of", id, e))?;
        Ok(())
    }
}

fn missing_value() -> ProviderError {
    ProviderError::Validation(vec![ValidationError::Constraint(
        "when user_id is provided, value must also be provided".to_string(),
    )])
}

#[async_trait]
impl ResourceController for UserCustomAttributes {
    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn plan(&self, config: &Record) -> Result<Value> {
        let prepared = prepare_config(&schema(), config)?;
        if prepared.int32("user_id")?.is_none() {
            return self.definitions.plan(config);
        }
        let shortname = prepared.require_string("shortname")?;
        let value = prepared.string("value")?.ok_or_else(missing_value)?;
        Ok(json!({ "custom_attributes": { shortname: value } }))
    }

    async fn create(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let config = prepare_config(&schema(), data.config())?;
        let Some(user_id) = config.int32("user_id")? else {
            return self.definitions.create(api, data).await;
        };
        let shortname = config.require_string("shortname")?;
        let value = config.string("value")?.ok_or_else(missing_value)?;
        let id = format!("{user_id}_{shortname}");

        tracing::info!(resource_type = %KIND, id = %id, "[CREATE] Setting custom attribute value");
        self.write_value(api, user_id, &shortname, Value::String(value), ErrorCategory::Create, &id)
            .await?;
        data.set_id(id.clone());
        tracing::info!(resource_type = %KIND, id = %id, "[CREATED] Set custom attribute value");
        self.read(api, data).await
    }

    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let id = require_id(data.id())?.to_string();
        let Some((user_id, shortname)) = split_value_id(&id) else {
            return self.definitions.read(api, data).await;
        };

        tracing::info!(resource_type = %KIND, id = %id, "[READ] Reading custom attribute value");
        let value = self
            .user_attributes(api, user_id, ErrorCategory::Read, &id)
            .await?
            .and_then(|attributes| attributes.get(shortname).cloned())
            .filter(|value| !value.is_null());
        let Some(value) = value else {
            tracing::info!(resource_type = %KIND, id = %id, "[NOT FOUND] Custom attribute value is gone");
            data.clear_id();
            return Ok(());
        };

        let mut state = Record::new()
            .with("user_id", user_id)
            .with("shortname", shortname)
            .with(
                "value",
                match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
            );
        for key in ["name", "position"] {
            if let Some(carried) = data.lookup(key).cloned() {
                state.insert(key, carried);
            }
        }
        data.set_state(state);
        Ok(())
    }

    async fn update(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let id = require_id(data.id())?.to_string();
        let Some((user_id, shortname)) = split_value_id(&id) else {
            return self.definitions.update(api, data).await;
        };
        let config = prepare_config(&schema(), data.config())?;
        let value = config.string("value")?.unwrap_or_default();

        tracing::info!(resource_type = %KIND, id = %id, "[UPDATE] Updating custom attribute value");
        self.write_value(api, user_id, shortname, Value::String(value), ErrorCategory::Update, &id)
            .await?;
        tracing::info!(resource_type = %KIND, id = %id, "[UPDATED] Updated custom attribute value");
        self.read(api, data).await
    }

    /// Clears a user's value; the attribute itself stays defined.
    async fn delete(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Err(CoreError::EmptyId.into());
        };
        let Some((user_id, shortname)) = split_value_id(&id) else {
            return self.definitions.delete(api, data).await;
        };

        tracing::info!(resource_type = %KIND, id = %id, "[DELETE] Clearing custom attribute value");
        let present = self
            .user_attributes(api, user_id, ErrorCategory::Delete, &id)
            .await?
            .is_some_and(|attributes| attributes.contains_key(shortname));
        if present {
            self.write_value(api, user_id, shortname, json!(""), ErrorCategory::Delete, &id)
                .await?;
        }
        tracing::info!(resource_type = %KIND, id = %id, "[DELETED] Cleared custom attribute value");
        data.clear_id();
        Ok(())
    }

    async fn import(&self, api: &dyn OneLoginApi, import_id: &str) -> Result<ResourceData> {
        if split_value_id(import_id).is_none() {
            return self.definitions.import(api, import_id).await;
        }
        tracing::info!(resource_type = %KIND, import_id, "[IMPORT] Importing resource");
        let mut data = ResourceData::default().with_id(import_id);
        self.read(api, &mut data).await?;
        Ok(data)
    }
}
