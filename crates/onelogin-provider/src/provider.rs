//! Provider entry point: configuration and the resource and data source
//! registries.

use std::collections::HashMap;
use std::sync::Arc;

use onelogin_client::{ApiResult, DynApi, HttpClient};
use onelogin_config::ProviderConfig;
use onelogin_core::{CoreError, ResourceKind};

use crate::controller::DynController;
use crate::data_source::{self, DataSource, DynDataSource};
use crate::resources;

/// Controllers of every resource type and every data source, keyed by type
/// name
#[derive(Clone)]
pub struct ResourceRegistry {
    controllers: HashMap<&'static str, DynController>,
    data_sources: HashMap<&'static str, DynDataSource>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        let controllers = ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind.type_name(), resources::controller(kind)))
            .collect();
        let data_sources = data_source::data_sources()
            .into_iter()
            .map(|source| (source.type_name(), source))
            .collect();
        Self {
            controllers,
            data_sources,
        }
    }

    /// Looks a controller up by `onelogin_<name>` or the short `<name>`.
    pub fn get(&self, type_name: &str) -> Result<DynController, CoreError> {
        let kind: ResourceKind = type_name.parse()?;
        self.controllers
            .get(kind.type_name())
            .cloned()
            .ok_or_else(|| CoreError::unknown_resource_type(type_name))
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.controllers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Looks a data source up by `onelogin_<name>` or the short `<name>`.
    pub fn data_source(&self, type_name: &str) -> Result<DynDataSource, CoreError> {
        let full = if type_name.starts_with("onelogin_") {
            type_name.to_string()
        } else {
            format!("onelogin_{type_name}")
        };
        self.data_sources
            .get(full.as_str())
            .cloned()
            .ok_or_else(|| CoreError::unknown_data_source(type_name))
    }

    /// Registered data source names, sorted
    pub fn data_source_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.data_sources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of resource types
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

/// A configured provider: an API handle plus the resource registry
#[derive(Clone)]
pub struct Provider {
    api: DynApi,
    registry: ResourceRegistry,
}

impl Provider {
    /// Builds the HTTP client for a validated configuration.
    pub fn configure(config: &ProviderConfig) -> ApiResult<Self> {
        let client = HttpClient::new(config)?;
        tracing::info!(base_url = %client.base_url(), "OneLogin provider configured");
        Ok(Self::with_api(Arc::new(client)))
    }

    /// Uses an existing API handle, such as the in-memory backend.
    pub fn with_api(api: DynApi) -> Self {
        Self {
            api,
            registry: ResourceRegistry::new(),
        }
    }

    pub fn api(&self) -> &DynApi {
        &self.api
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn resource(&self, type_name: &str) -> Result<DynController, CoreError> {
        self.registry.get(type_name)
    }

    pub fn data_source(&self, type_name: &str) -> Result<DynDataSource, CoreError> {
        self.registry.data_source(type_name)
    }
}
