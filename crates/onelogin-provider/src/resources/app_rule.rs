//! `onelogin_app_rules`: provisioning rules nested under an app.

use onelogin_client::Collection;
use onelogin_core::{ResourceKind, Setting, parse_nested_import_id, validation::MATCH_TYPES};
use serde::{Deserialize, Serialize};

use super::rules::{Condition, RuleAction, flatten_conditions, inflate_conditions};
use crate::controller::ResourceMapping;
use crate::error::Result;
use crate::record::{DecodeError, Record};
use crate::resource::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppRule {
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::id"
    )]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Setting::is_unset")]
    pub match_type: Setting<String>,
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::flag"
    )]
    pub enabled: Setting<bool>,
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::int32"
    )]
    pub position: Setting<i32>,
    #[serde(default, deserialize_with = "wire::nullable_list")]
    pub conditions: Vec<Condition>,
    #[serde(default, deserialize_with = "wire::nullable_list")]
    pub actions: Vec<RuleAction>,
}

pub struct AppRules;

impl ResourceMapping for AppRules {
    type Model = AppRule;

    fn kind(&self) -> ResourceKind {
        ResourceKind::AppRules
    }

    fn schema(&self) -> Schema {
        Schema::new([
            Attribute::string("app_id").required().force_new(),
            Attribute::string("name").required(),
            Attribute::string("match").required().one_of(MATCH_TYPES),
            Attribute::bool("enabled").default(false),
            Attribute::int("position").optional_computed(),
            Attribute::blocks("conditions", Condition::schema()),
            Attribute::blocks("actions", RuleAction::schema()),
        ])
    }

    fn collection(&self, data: &ResourceData) -> Result<Collection> {
        let app_id = data
            .lookup_string("app_id")?
            .ok_or_else(|| DecodeError::Missing {
                field: "app_id".to_string(),
            })?;
        Ok(Collection::AppRules { app_id })
    }

    fn inflate(&self, config: &Record) -> Result<AppRule> {
        Ok(AppRule {
            id: Setting::Unset,
            name: config.string("name")?.into(),
            match_type: config.string("match")?.into(),
            enabled: config.bool("enabled")?.into(),
            position: config.int32("position")?.into(),
            conditions: inflate_conditions(config)?,
            actions: config
                .blocks("actions")?
                .iter()
                .map(RuleAction::inflate)
                .collect::<std::result::Result<_, _>>()?,
        })
    }

    fn flatten(&self, rule: &AppRule) -> Record {
        let mut out = Record::new();
        out.set("name", &rule.name);
        out.set("match", &rule.match_type);
        out.set("enabled", &rule.enabled);
        out.set("position", &rule.position);
        out.insert_blocks("conditions", flatten_conditions(&rule.conditions));
        out.insert_blocks(
            "actions",
            rule.actions.iter().map(RuleAction::flatten).collect(),
        );
        out
    }

    fn carried_keys(&self) -> &'static [&'static str] {
        &["app_id"]
    }

    /// Import IDs take the form `<app_id>/<rule_id>`.
    fn import(&self, import_id: &str, data: &mut ResourceData) -> Result<()> {
        let (app_id, rule_id) = parse_nested_import_id(import_id)?;
        data.state_mut().insert("app_id", app_id);
        data.set_id(rule_id);
        Ok(())
    }
}
