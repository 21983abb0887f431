//! Conditions and actions shared by app rules, user mappings and smart hooks.

use onelogin_core::Setting;
use serde::{Deserialize, Serialize};

use crate::record::{DecodeError, Record};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::wire;

/// Suffix marking an action that takes no expression
pub const NO_EXPRESSION_SUFFIX: &str = "_from_existing";

/// The only action the expression-less alias applies to
const ALIASED_ACTION: &str = "set_role";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub source: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub operator: Setting<String>,
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::lenient_string"
    )]
    pub value: Setting<String>,
}

impl Condition {
    pub fn schema() -> Schema {
        Schema::new([
            Attribute::string("source").required(),
            Attribute::string("operator").required(),
            Attribute::string("value").required(),
        ])
    }

    pub fn inflate(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            source: record.string("source")?.into(),
            operator: record.string("operator")?.into(),
            value: record.string("value")?.into(),
        })
    }

    pub fn flatten(&self) -> Record {
        let mut out = Record::new();
        out.set("source", &self.source);
        out.set("operator", &self.operator);
        out.set("value", &self.value);
        out
    }
}

pub fn inflate_conditions(record: &Record) -> Result<Vec<Condition>, DecodeError> {
    record
        .blocks("conditions")?
        .iter()
        .map(Condition::inflate)
        .collect()
}

pub fn flatten_conditions(conditions: &[Condition]) -> Vec<Record> {
    conditions.iter().map(Condition::flatten).collect()
}

/// Action of an app rule.
///
/// `set_role_from_existing` in configuration stands for `set_role` without an
/// expression; the mapping is applied in both directions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub action: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub expression: Setting<String>,
    #[serde(default, deserialize_with = "wire::lenient_string_list")]
    pub value: Vec<String>,
}

impl RuleAction {
    pub fn schema() -> Schema {
        Schema::new([
            Attribute::string("action").required(),
            Attribute::string("expression"),
            Attribute::set("value", AttributeType::String).required(),
        ])
    }

    pub fn inflate(record: &Record) -> Result<Self, DecodeError> {
        let mut out = Self {
            value: record.string_list("value")?.unwrap_or_default(),
            ..Self::default()
        };
        if let Some(action) = record.string("action")? {
            match action.strip_suffix(NO_EXPRESSION_SUFFIX) {
                Some(base) if base == ALIASED_ACTION => {
                    out.action = Setting::Set(base.to_string());
                }
                _ => {
                    out.expression = record.string("expression")?.into();
                    out.action = Setting::Set(action);
                }
            }
        }
        Ok(out)
    }

    pub fn flatten(&self) -> Record {
        let mut out = Record::new();
        match (&self.action, &self.expression) {
            (Setting::Set(action), Setting::Unset) if action == ALIASED_ACTION => {
                out.insert("action", format!("{action}{NO_EXPRESSION_SUFFIX}"));
            }
            _ => {
                out.set("action", &self.action);
                out.set("expression", &self.expression);
            }
        }
        out.insert("value", self.value.clone());
        out
    }
}

/// Action of a user mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingAction {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub action: Setting<String>,
    #[serde(default, deserialize_with = "wire::lenient_string_list")]
    pub value: Vec<String>,
}

impl MappingAction {
    pub fn schema() -> Schema {
        Schema::new([
            Attribute::string("action").required(),
            Attribute::list("value", AttributeType::String).required(),
        ])
    }

    pub fn inflate(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            action: record.string("action")?.into(),
            value: record.string_list("value")?.unwrap_or_default(),
        })
    }

    pub fn flatten(&self) -> Record {
        let mut out = Record::new();
        out.set("action", &self.action);
        out.insert("value", self.value.clone());
        out
    }
}
