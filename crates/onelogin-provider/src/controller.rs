//! Create/Read/Update/Delete/Import contract shared by all resource types.
//!
//! Most resources are a [`ResourceMapping`] (schema, collection, inflate,
//! flatten) wrapped in a [`Controller`], which implements the standard
//! reconciliation behaviour:
//!
//! - create: inflate, create, store the ID, read back
//! - read: get, flatten; a missing object clears the ID without an error
//! - update: inflate, update, read back; a response without an ID means the
//!   object was removed out of band and clears the ID
//! - delete: delete and clear the ID; a failure leaves the state untouched
//!
//! Resources whose lifecycle is not one object in one collection implement
//! [`ResourceController`] directly.

use std::sync::Arc;

use async_trait::async_trait;
use onelogin_client::{ApiError, Collection, OneLoginApi, extract_id};
use onelogin_core::{CoreError, ErrorCategory, ResourceKind, require_id};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::Schema;

/// Lifecycle entry points of one resource type, as called by the host.
#[async_trait]
pub trait ResourceController: Send + Sync {
    fn kind(&self) -> ResourceKind;

    fn schema(&self) -> Schema;

    /// Validates a configuration and returns the request body it inflates to,
    /// without calling the API.
    fn plan(&self, config: &Record) -> Result<Value>;

    async fn create(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()>;

    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()>;

    async fn delete(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()>;

    /// Adopts an existing remote object and reads it.
    async fn import(&self, api: &dyn OneLoginApi, import_id: &str) -> Result<ResourceData>;
}

/// Type alias for a shareable controller
pub type DynController = Arc<dyn ResourceController>;

/// Schema and transforms of a resource backed by a single API collection.
#[async_trait]
pub trait ResourceMapping: Send + Sync + 'static {
    /// The API object exchanged with the collection
    type Model: Serialize + DeserializeOwned + Send + Sync;

    fn kind(&self) -> ResourceKind;

    fn schema(&self) -> Schema;

    fn collection(&self, data: &ResourceData) -> Result<Collection>;

    /// Configuration record to request object
    fn inflate(&self, config: &Record) -> Result<Self::Model>;

    /// Response object to state record
    fn flatten(&self, model: &Self::Model) -> Record;

    fn decode(&self, body: Value) -> Result<Self::Model> {
        serde_json::from_value(body).map_err(ProviderError::response)
    }

    fn encode(&self, model: &Self::Model) -> Result<Value> {
        Ok(serde_json::to_value(model)?)
    }

    /// Identifier carried by a create or update response
    fn response_id(&self, body: &Value) -> Option<String> {
        extract_id(body)
    }

    /// State keys copied from configuration because responses omit them
    fn carried_keys(&self) -> &'static [&'static str] {
        &[]
    }

    /// Reason creation is refused, for resources the API cannot create
    fn create_unsupported(&self) -> Option<&'static str> {
        None
    }

    /// Request object for an update; defaults to plain inflation.
    async fn update_model(
        &self,
        _api: &dyn OneLoginApi,
        _data: &ResourceData,
        config: &Record,
    ) -> Result<Self::Model> {
        self.inflate(config)
    }

    /// Sub-resource steps run once the primary object exists.
    async fn after_create(
        &self,
        _api: &dyn OneLoginApi,
        _config: &Record,
        _id: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn after_update(
        &self,
        _api: &dyn OneLoginApi,
        _config: &Record,
        _id: &str,
    ) -> Result<()> {
        Ok(())
    }

    /// Applies an import ID; the default passes it through.
    fn import(&self, import_id: &str, data: &mut ResourceData) -> Result<()> {
        data.set_id(import_id);
        Ok(())
    }
}

/// Validated copy of the configuration with defaults applied
pub(crate) fn prepare_config(schema: &Schema, config: &Record) -> Result<Record> {
    let mut config = config.clone();
    schema.apply_defaults(&mut config);
    schema.validate(&config).map_err(ProviderError::Validation)?;
    Ok(config)
}

/// Logs a failed remote call and wraps it with its context.
pub(crate) fn api_failure(
    kind: ResourceKind,
    category: ErrorCategory,
    operation: &str,
    id: &str,
    err: ApiError,
) -> ProviderError {
    tracing::error!(
        resource_type = %kind,
        id,
        error = %err,
        "[ERROR] There was a problem {operation} the resource"
    );
    ProviderError::api(category, kind.type_name(), operation, id, err)
}

/// Standard delete: refuses an empty ID, clears it on success and leaves
/// state alone on failure.
pub(crate) async fn standard_delete(
    kind: ResourceKind,
    api: &dyn OneLoginApi,
    collection: &Collection,
    data: &mut ResourceData,
) -> Result<()> {
    let id = require_id(data.id())?.to_string();
    tracing::info!(resource_type = %kind, id = %id, "[DELETE] Deleting resource");
    match api.delete(collection, &id).await {
        Ok(()) => {
            tracing::info!(resource_type = %kind, id = %id, "[DELETED] Deleted resource");
            data.clear_id();
            Ok(())
        }
        Err(e) => Err(api_failure(kind, ErrorCategory::Delete, "deleting", &id, e)),
    }
}

/// [`ResourceController`] over a [`ResourceMapping`]
pub struct Controller<M> {
    mapping: M,
}

impl<M: ResourceMapping> Controller<M> {
    pub fn new(mapping: M) -> Self {
        Self { mapping }
    }

    /// Persists the ID of an object that exists despite a failed step, reads
    /// it back and reports the failure.
    async fn recover_partial(
        &self,
        api: &dyn OneLoginApi,
        data: &mut ResourceData,
        category: ErrorCategory,
        id: String,
        message: String,
    ) -> Result<()> {
        let kind = self.mapping.kind();
        tracing::warn!(
            resource_type = %kind,
            id = %id,
            message = %message,
            "[PARTIAL] Resource exists but a later step failed"
        );
        data.set_id(id.clone());
        self.read(api, data).await?;
        Err(ProviderError::partial_success(
            category,
            kind.type_name(),
            id,
            message,
        ))
    }
}

#[async_trait]
impl<M: ResourceMapping> ResourceController for Controller<M> {
    fn kind(&self) -> ResourceKind {
        self.mapping.kind()
    }

    fn schema(&self) -> Schema {
        self.mapping.schema()
    }

    fn plan(&self, config: &Record) -> Result<Value> {
        let config = prepare_config(&self.mapping.schema(), config)?;
        let model = self.mapping.inflate(&config)?;
        self.mapping.encode(&model)
    }

    async fn create(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let kind = self.mapping.kind();
        if let Some(reason) = self.mapping.create_unsupported() {
            return Err(ProviderError::Unsupported(reason.to_string()));
        }

        let config = prepare_config(&self.mapping.schema(), data.config())?;
        let model = self.mapping.inflate(&config)?;
        let body = self.mapping.encode(&model)?;
        let collection = self.mapping.collection(data)?;

        tracing::info!(resource_type = %kind, "[CREATE] Creating resource");
        let created = match api.create(&collection, &body).await {
            Ok(created) => created,
            Err(ApiError::PartialSuccess { resource, message }) => {
                return match self.mapping.response_id(&resource) {
                    Some(id) => {
                        self.recover_partial(api, data, ErrorCategory::Create, id, message)
                            .await
                    }
                    None => Err(api_failure(
                        kind,
                        ErrorCategory::Create,
                        "creating",
                        "",
                        ApiError::PartialSuccess { resource, message },
                    )),
                };
            }
            Err(e) => return Err(api_failure(kind, ErrorCategory::Create, "creating", "", e)),
        };

        let id = self.mapping.response_id(&created).ok_or_else(|| {
            ProviderError::response(format!("{kind} create response carried no id"))
        })?;
        data.set_id(id.clone());
        tracing::info!(resource_type = %kind, id = %id, "[CREATED] Created resource");

        if let Err(e) = self.mapping.after_create(api, &config, &id).await {
            return self
                .recover_partial(api, data, ErrorCategory::Create, id, e.to_string())
                .await;
        }
        self.read(api, data).await
    }

    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let kind = self.mapping.kind();
        let id = require_id(data.id())?.to_string();
        let collection = self.mapping.collection(data)?;

        tracing::info!(resource_type = %kind, id = %id, "[READ] Reading resource");
        let body = match api.get(&collection, &id).await {
            Ok(Some(body)) => body,
            Ok(None) => Value::Null,
            Err(e) if e.is_not_found() => Value::Null,
            Err(e) => return Err(api_failure(kind, ErrorCategory::Read, "reading", &id, e)),
        };
        if body.is_null() {
            tracing::info!(resource_type = %kind, id = %id, "[NOT FOUND] Resource no longer exists");
            data.clear_id();
            return Ok(());
        }

        let model = self.mapping.decode(body)?;
        let mut state = self.mapping.flatten(&model);
        for key in self.mapping.carried_keys() {
            if !state.contains(key)
                && let Some(value) = data.lookup(key).cloned()
            {
                state.insert(*key, value);
            }
        }
        data.set_state(state);
        Ok(())
    }

    async fn update(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let kind = self.mapping.kind();
        let id = require_id(data.id())?.to_string();

        let config = prepare_config(&self.mapping.schema(), data.config())?;
        let model = self.mapping.update_model(api, data, &config).await?;
        let body = self.mapping.encode(&model)?;
        let collection = self.mapping.collection(data)?;

        tracing::info!(resource_type = %kind, id = %id, "[UPDATE] Updating resource");
        let response = api
            .update(&collection, &id, &body)
            .await
            .map_err(|e| api_failure(kind, ErrorCategory::Update, "updating", &id, e))?;

        if self.mapping.response_id(&response).is_none() {
            tracing::info!(
                resource_type = %kind,
                id = %id,
                "[NOT FOUND] Resource was removed outside of configuration"
            );
            data.clear_id();
            return Ok(());
        }
        tracing::info!(resource_type = %kind, id = %id, "[UPDATED] Updated resource");

        if let Err(e) = self.mapping.after_update(api, &config, &id).await {
            return self
                .recover_partial(api, data, ErrorCategory::Update, id, e.to_string())
                .await;
        }
        self.read(api, data).await
    }

    async fn delete(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        if data.id().is_none() {
            return Err(CoreError::EmptyId.into());
        }
        let collection = self.mapping.collection(data)?;
        standard_delete(self.mapping.kind(), api, &collection, data).await
    }

    async fn import(&self, api: &dyn OneLoginApi, import_id: &str) -> Result<ResourceData> {
        let mut data = ResourceData::default();
        self.mapping.import(import_id, &mut data)?;
        tracing::info!(
            resource_type = %self.mapping.kind(),
            import_id,
            "[IMPORT] Importing resource"
        );
        self.read(api, &mut data).await?;
        Ok(data)
    }
}
