//! `onelogin_smarthooks`

use indexmap::IndexMap;
use onelogin_client::Collection;
use onelogin_core::{ResourceKind, Setting, validation::SMARTHOOK_TYPES};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::rules::{Condition, flatten_conditions, inflate_conditions};
use crate::controller::ResourceMapping;
use crate::error::Result;
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookOptions {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub risk_enabled: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub mfa_device_info_enabled: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub location_enabled: Setting<bool>,
}

/// Reference to an environment variable by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartHook {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Setting::is_unset")]
    pub hook_type: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub function: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub disabled: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub timeout: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub retries: Setting<i32>,
    #[serde(default, deserialize_with = "env_var_refs")]
    pub env_vars: Vec<EnvVarRef>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub runtime: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub context_version: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub options: Setting<HookOptions>,
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::string_map"
    )]
    pub packages: Setting<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "wire::nullable_list")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing)]
    pub status: Setting<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Setting<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Setting<String>,
}

/// Environment variable references arrive as names or as `{name}` objects.
fn env_var_refs<'de, D>(deserializer: D) -> std::result::Result<Vec<EnvVarRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(EnvVarRef { name }),
            Value::Object(map) => match map.get("name") {
                Some(Value::String(name)) => Some(EnvVarRef { name: name.clone() }),
                _ => None,
            },
            _ => None,
        })
        .collect())
}

const OPTION_FLAGS: [&str; 3] = ["risk_enabled", "mfa_device_info_enabled", "location_enabled"];

pub struct SmartHooks;

impl ResourceMapping for SmartHooks {
    type Model = SmartHook;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Smarthooks
    }

    fn schema(&self) -> Schema {
        Schema::new([
            Attribute::string("type").required().one_of(SMARTHOOK_TYPES),
            Attribute::string("function")
                .required()
                .description("Base64 encoded hook source"),
            Attribute::bool("disabled").default(false),
            Attribute::int("timeout"),
            Attribute::int("retries"),
            Attribute::list("env_vars", AttributeType::String),
            Attribute::string("runtime"),
            Attribute::string("context_version").optional_computed(),
            Attribute::block(
                "options",
                Schema::new(OPTION_FLAGS.map(|name| Attribute::bool(name).default(false))),
            ),
            Attribute::map("packages", AttributeType::String),
            Attribute::blocks("conditions", Condition::schema()),
            Attribute::string("status").computed(),
            Attribute::string("created_at").computed(),
            Attribute::string("updated_at").computed(),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::SmartHooks)
    }

    fn inflate(&self, config: &Record) -> Result<SmartHook> {
        let options = match config.block("options")? {
            Some(block) => Setting::Set(HookOptions {
                risk_enabled: block.bool("risk_enabled")?.into(),
                mfa_device_info_enabled: block.bool("mfa_device_info_enabled")?.into(),
                location_enabled: block.bool("location_enabled")?.into(),
            }),
            None => Setting::Unset,
        };
        Ok(SmartHook {
            hook_type: config.string("type")?.into(),
            function: config.string("function")?.into(),
            disabled: config.bool("disabled")?.into(),
            timeout: config.int32("timeout")?.into(),
            retries: config.int32("retries")?.into(),
            env_vars: config
                .string_list("env_vars")?
                .unwrap_or_default()
                .into_iter()
                .map(|name| EnvVarRef { name })
                .collect(),
            runtime: config.string("runtime")?.into(),
            context_version: config.string("context_version")?.into(),
            options,
            packages: config.string_map("packages")?.into(),
            conditions: inflate_conditions(config)?,
            ..SmartHook::default()
        })
    }

    fn flatten(&self, hook: &SmartHook) -> Record {
        let mut out = Record::new();
        out.set("type", &hook.hook_type);
        out.set("function", &hook.function);
        out.set("disabled", &hook.disabled);
        out.set("timeout", &hook.timeout);
        out.set("retries", &hook.retries);
        out.insert(
            "env_vars",
            hook.env_vars
                .iter()
                .map(|var| var.name.clone())
                .collect::<Vec<_>>(),
        );
        out.set("runtime", &hook.runtime);
        out.set("context_version", &hook.context_version);
        if let Setting::Set(options) = &hook.options {
            let mut block = Record::new();
            block.set("risk_enabled", &options.risk_enabled);
            block.set("mfa_device_info_enabled", &options.mfa_device_info_enabled);
            block.set("location_enabled", &options.location_enabled);
            out.insert_blocks("options", vec![block]);
        }
        if let Setting::Set(packages) = &hook.packages {
            out.insert(
                "packages",
                Value::Object(
                    packages
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect(),
                ),
            );
        }
        if !hook.conditions.is_empty() {
            out.insert_blocks("conditions", flatten_conditions(&hook.conditions));
        }
        out.set("status", &hook.status);
        out.set("created_at", &hook.created_at);
        out.set("updated_at", &hook.updated_at);
        out
    }
}
