//! App `parameters` blocks.
//!
//! The API keys parameters by name in a map; configuration lists them as
//! blocks carrying `param_key_name`.

use indexmap::IndexMap;
use onelogin_core::Setting;
use serde::{Deserialize, Serialize};

use crate::record::{DecodeError, Record};
use crate::schema::{Attribute, Schema};
use crate::wire;

const STRING_FIELDS: [&str; 6] = [
    "label",
    "user_attribute_mappings",
    "user_attribute_macros",
    "attributes_transformations",
    "default_values",
    "values",
];

const FLAG_FIELDS: [&str; 4] = [
    "skip_if_blank",
    "provisioned_entitlements",
    "safe_entitlements_enabled",
    "include_in_saml_assertion",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(
        rename = "id",
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::int32"
    )]
    pub param_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub label: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub user_attribute_mappings: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub user_attribute_macros: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub attributes_transformations: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub default_values: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub values: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub skip_if_blank: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub provisioned_entitlements: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub safe_entitlements_enabled: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub include_in_saml_assertion: Setting<bool>,
}

impl Parameter {
    pub fn schema() -> Schema {
        let mut attributes = vec![
            Attribute::string("param_key_name").required(),
            Attribute::int("param_id").computed(),
        ];
        attributes.extend(STRING_FIELDS.into_iter().map(Attribute::string));
        attributes.extend(FLAG_FIELDS.into_iter().map(Attribute::bool));
        Schema::new(attributes)
    }

    fn strings(&self) -> [&Setting<String>; 6] {
        [
            &self.label,
            &self.user_attribute_mappings,
            &self.user_attribute_macros,
            &self.attributes_transformations,
            &self.default_values,
            &self.values,
        ]
    }

    fn flags(&self) -> [&Setting<bool>; 4] {
        [
            &self.skip_if_blank,
            &self.provisioned_entitlements,
            &self.safe_entitlements_enabled,
            &self.include_in_saml_assertion,
        ]
    }

    /// Inflates one block; `param_id` is only sent when non-zero.
    pub fn inflate(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            param_id: Setting::non_zero_opt(record.int32("param_id")?),
            label: record.string("label")?.into(),
            user_attribute_mappings: record.string("user_attribute_mappings")?.into(),
            user_attribute_macros: record.string("user_attribute_macros")?.into(),
            attributes_transformations: record.string("attributes_transformations")?.into(),
            default_values: record.string("default_values")?.into(),
            values: record.string("values")?.into(),
            skip_if_blank: record.bool("skip_if_blank")?.into(),
            provisioned_entitlements: record.bool("provisioned_entitlements")?.into(),
            safe_entitlements_enabled: record.bool("safe_entitlements_enabled")?.into(),
            include_in_saml_assertion: record.bool("include_in_saml_assertion")?.into(),
        })
    }

    pub fn flatten(&self, key_name: &str) -> Record {
        let mut out = Record::new().with("param_key_name", key_name);
        out.set("param_id", &self.param_id);
        for (name, value) in STRING_FIELDS.iter().zip(self.strings()) {
            out.set(name, value);
        }
        for (name, value) in FLAG_FIELDS.iter().zip(self.flags()) {
            out.set(name, value);
        }
        out
    }
}

pub fn inflate_parameters(config: &Record) -> Result<IndexMap<String, Parameter>, DecodeError> {
    config
        .blocks("parameters")?
        .iter()
        .map(|block| -> Result<_, DecodeError> {
            Ok((block.require_string("param_key_name")?, Parameter::inflate(block)?))
        })
        .collect()
}

pub fn flatten_parameters(parameters: &IndexMap<String, Parameter>) -> Vec<Record> {
    parameters
        .iter()
        .map(|(name, parameter)| parameter.flatten(name))
        .collect()
}

/// Fills in parameter IDs known from a previous read, so updates address
/// existing parameters instead of creating new ones.
pub fn carry_param_ids(parameters: &mut IndexMap<String, Parameter>, state: &Record) {
    let Ok(known) = inflate_parameters(state) else {
        return;
    };
    for (name, parameter) in parameters.iter_mut() {
        if parameter.param_id.is_unset()
            && let Some(previous) = known.get(name)
        {
            parameter.param_id = previous.param_id;
        }
    }
}
