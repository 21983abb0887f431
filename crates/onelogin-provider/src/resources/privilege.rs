//! `onelogin_privileges`
//!
//! Privilege documents use capitalised statement keys on the wire
//! (`Statement`, `Effect`, `Action`, `Scope`); lower-case keys are accepted
//! when decoding.

use onelogin_client::Collection;
use onelogin_core::{ResourceKind, Setting};
use serde::{Deserialize, Serialize};

use crate::controller::ResourceMapping;
use crate::error::Result;
use crate::record::{DecodeError, Record};
use crate::resource::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::wire;

pub const DEFAULT_VERSION: &str = "2018-05-18";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Effect", alias = "effect", default, skip_serializing_if = "Setting::is_unset")]
    pub effect: Setting<String>,
    #[serde(rename = "Action", alias = "action", default, deserialize_with = "wire::lenient_string_list")]
    pub action: Vec<String>,
    #[serde(rename = "Scope", alias = "scope", default, deserialize_with = "wire::lenient_string_list")]
    pub scope: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivilegeDocument {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub version: Setting<String>,
    #[serde(rename = "Statement", alias = "statement", default, deserialize_with = "wire::nullable_list")]
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Privilege {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub description: Setting<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "wire::int32_list")]
    pub user_ids: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "wire::int32_list")]
    pub role_ids: Vec<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub privilege: Setting<PrivilegeDocument>,
}

fn inflate_statement(block: &Record) -> std::result::Result<Statement, DecodeError> {
    Ok(Statement {
        effect: block.string("effect")?.into(),
        action: block.string_list("action")?.unwrap_or_default(),
        scope: block.string_list("scope")?.unwrap_or_default(),
    })
}

pub struct Privileges;

impl ResourceMapping for Privileges {
    type Model = Privilege;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Privileges
    }

    fn schema(&self) -> Schema {
        let statement = Schema::new([
            Attribute::string("effect").required(),
            Attribute::list("action", AttributeType::String).required(),
            Attribute::list("scope", AttributeType::String).required(),
        ]);
        Schema::new([
            Attribute::string("name").required(),
            Attribute::string("description"),
            Attribute::set("user_ids", AttributeType::Int),
            Attribute::set("role_ids", AttributeType::Int),
            Attribute::block(
                "privilege",
                Schema::new([
                    Attribute::string("version").default(DEFAULT_VERSION),
                    Attribute::blocks("statement", statement).required(),
                ]),
            )
            .required(),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::Privileges)
    }

    fn inflate(&self, config: &Record) -> Result<Privilege> {
        let privilege = match config.block("privilege")? {
            Some(block) => Setting::Set(PrivilegeDocument {
                version: block.string("version")?.into(),
                statement: block
                    .blocks("statement")?
                    .iter()
                    .map(inflate_statement)
                    .collect::<std::result::Result<_, _>>()?,
            }),
            None => Setting::Unset,
        };
        Ok(Privilege {
            id: Setting::Unset,
            name: config.string("name")?.into(),
            description: config.string("description")?.into(),
            user_ids: config.int_list("user_ids")?.unwrap_or_default(),
            role_ids: config.int_list("role_ids")?.unwrap_or_default(),
            privilege,
        })
    }

    fn flatten(&self, privilege: &Privilege) -> Record {
        let mut out = Record::new();
        out.set("name", &privilege.name);
        out.set("description", &privilege.description);
        out.insert("user_ids", privilege.user_ids.clone());
        out.insert("role_ids", privilege.role_ids.clone());
        if let Setting::Set(document) = &privilege.privilege {
            let statements = document
                .statement
                .iter()
                .map(|s| {
                    let mut block = Record::new();
                    block.set("effect", &s.effect);
                    block.insert("action", s.action.clone());
                    block.insert("scope", s.scope.clone());
                    block
                })
                .collect();
            let mut block = Record::new();
            block.set("version", &document.version);
            block.insert_blocks("statement", statements);
            out.insert_blocks("privilege", vec![block]);
        }
        out
    }
}
