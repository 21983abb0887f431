//! `onelogin_smarthook_environment_variables`

use async_trait::async_trait;
use onelogin_client::{Collection, OneLoginApi};
use onelogin_core::{ResourceKind, Setting};
use serde::{Deserialize, Serialize};

use crate::controller::ResourceMapping;
use crate::error::Result;
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub value: Setting<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Setting<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Setting<String>,
}

pub struct SmartHookEnvVars;

#[async_trait]
impl ResourceMapping for SmartHookEnvVars {
    type Model = EnvVar;

    fn kind(&self) -> ResourceKind {
        ResourceKind::SmarthookEnvironmentVariables
    }

    fn schema(&self) -> Schema {
        Schema::new([
            Attribute::string("name").required().force_new(),
            Attribute::string("value").required().sensitive(),
            Attribute::string("created_at").computed(),
            Attribute::string("updated_at").computed(),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::SmartHookEnvVars)
    }

    fn inflate(&self, config: &Record) -> Result<EnvVar> {
        Ok(EnvVar {
            name: config.string("name")?.into(),
            value: config.string("value")?.into(),
            ..EnvVar::default()
        })
    }

    fn flatten(&self, var: &EnvVar) -> Record {
        let mut out = Record::new();
        out.set("name", &var.name);
        out.set("value", &var.value);
        out.set("created_at", &var.created_at);
        out.set("updated_at", &var.updated_at);
        out
    }

    /// Values are never returned by the API.
    fn carried_keys(&self) -> &'static [&'static str] {
        &["value"]
    }

    /// The name is immutable, so updates carry the value alone.
    async fn update_model(
        &self,
        _api: &dyn OneLoginApi,
        _data: &ResourceData,
        config: &Record,
    ) -> Result<EnvVar> {
        Ok(EnvVar {
            value: config.string("value")?.into(),
            ..EnvVar::default()
        })
    }
}
