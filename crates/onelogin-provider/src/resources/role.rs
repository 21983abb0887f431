//! `onelogin_roles`

use onelogin_client::Collection;
use onelogin_core::{ResourceKind, Setting};
use serde::{Deserialize, Serialize};

use crate::controller::ResourceMapping;
use crate::error::Result;
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::id",
        serialize_with = "wire::numeric_id"
    )]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "wire::int32_list")]
    pub apps: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "wire::int32_list")]
    pub users: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "wire::int32_list")]
    pub admins: Vec<i32>,
}

pub struct Roles;

impl ResourceMapping for Roles {
    type Model = Role;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Roles
    }

    fn schema(&self) -> Schema {
        Schema::new([
            Attribute::string("id"),
            Attribute::string("name").required(),
            Attribute::set("apps", AttributeType::Int),
            Attribute::set("users", AttributeType::Int),
            Attribute::set("admins", AttributeType::Int),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::Roles)
    }

    /// Empty sets are left out of the request.
    fn inflate(&self, config: &Record) -> Result<Role> {
        Ok(Role {
            id: config.lenient_id("id")?.map(|id| id.to_string()).into(),
            name: config.string("name")?.into(),
            apps: config.int_list("apps")?.unwrap_or_default(),
            users: config.int_list("users")?.unwrap_or_default(),
            admins: config.int_list("admins")?.unwrap_or_default(),
        })
    }

    /// Missing sets read as empty.
    fn flatten(&self, role: &Role) -> Record {
        let mut out = Record::new();
        out.set("name", &role.name);
        out.insert("apps", role.apps.clone());
        out.insert("users", role.users.clone());
        out.insert("admins", role.admins.clone());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn test_empty_sets_not_sent() {
        let config =
            Record::from_value(json!({"name": "admins", "apps": [], "users": [7, 9]})).unwrap();
        let body = Roles.encode(&Roles.inflate(&config).unwrap()).unwrap();
        assert_json_eq!(body, json!({"name": "admins", "users": [7, 9]}));
    }

    #[test]
    fn test_configured_id() {
        let config = Record::from_value(json!({"id": "42", "name": "admins"})).unwrap();
        let body = Roles.encode(&Roles.inflate(&config).unwrap()).unwrap();
        assert_json_eq!(body, json!({"id": 42, "name": "admins"}));

        let config = Record::from_value(json!({"id": "abc", "name": "admins"})).unwrap();
        let body = Roles.encode(&Roles.inflate(&config).unwrap()).unwrap();
        assert_json_eq!(body, json!({"name": "admins"}));
    }

    #[test]
    fn test_read_defaults_sets() {
        let role = Roles.decode(json!({"id": 3, "name": "admins", "users": null})).unwrap();
        assert_json_eq!(
            Roles.flatten(&role).into_value(),
            json!({"name": "admins", "apps": [], "users": [], "admins": []})
        );
    }
}
