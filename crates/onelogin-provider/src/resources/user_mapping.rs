//! `onelogin_user_mappings`

use onelogin_client::Collection;
use onelogin_core::{ResourceKind, Setting, validation::MATCH_TYPES};
use serde::{Deserialize, Serialize};

use super::rules::{Condition, MappingAction, flatten_conditions, inflate_conditions};
use crate::controller::ResourceMapping;
use crate::error::Result;
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMapping {
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::id",
        serialize_with = "wire::numeric_id"
    )]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Setting::is_unset")]
    pub match_type: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub enabled: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub position: Setting<i32>,
    #[serde(default, deserialize_with = "wire::nullable_list")]
    pub conditions: Vec<Condition>,
    #[serde(default, deserialize_with = "wire::nullable_list")]
    pub actions: Vec<MappingAction>,
}

pub struct UserMappings;

impl ResourceMapping for UserMappings {
    type Model = UserMapping;

    fn kind(&self) -> ResourceKind {
        ResourceKind::UserMappings
    }

    fn schema(&self) -> Schema {
        Schema::new([
            Attribute::string("id"),
            Attribute::string("name").required(),
            Attribute::string("match").required().one_of(MATCH_TYPES),
            Attribute::bool("enabled").default(false),
            Attribute::int("position").required(),
            Attribute::blocks("conditions", Condition::schema()),
            Attribute::blocks("actions", MappingAction::schema()),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::UserMappings)
    }

    fn inflate(&self, config: &Record) -> Result<UserMapping> {
        Ok(UserMapping {
            id: config.lenient_id("id")?.map(|id| id.to_string()).into(),
            name: config.string("name")?.into(),
            match_type: config.string("match")?.into(),
            enabled: config.bool("enabled")?.into(),
            position: config.int32("position")?.into(),
            conditions: inflate_conditions(config)?,
            actions: config
                .blocks("actions")?
                .iter()
                .map(MappingAction::inflate)
                .collect::<std::result::Result<_, _>>()?,
        })
    }

    fn flatten(&self, mapping: &UserMapping) -> Record {
        let mut out = Record::new();
        out.set("name", &mapping.name);
        out.set("match", &mapping.match_type);
        out.set("enabled", &mapping.enabled);
        out.set("position", &mapping.position);
        out.insert_blocks("conditions", flatten_conditions(&mapping.conditions));
        out.insert_blocks(
            "actions",
            mapping.actions.iter().map(MappingAction::flatten).collect(),
        );
        out
    }

    /// Mapping IDs of 0 are placeholders and never addressed.
    fn response_id(&self, body: &serde_json::Value) -> Option<String> {
        onelogin_client::extract_id(body).filter(|id| id != "0")
    }
}
