//! `onelogin_groups`

use onelogin_client::Collection;
use onelogin_core::{ResourceKind, Setting};
use serde::{Deserialize, Serialize};

use crate::controller::ResourceMapping;
use crate::error::Result;
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wire;

pub const CREATE_UNSUPPORTED: &str = "Creating groups is not yet supported by the OneLogin API";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::lenient_string")]
    pub reference: Setting<String>,
}

pub struct Groups;

impl ResourceMapping for Groups {
    type Model = Group;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Groups
    }

    fn schema(&self) -> Schema {
        Schema::new([
            Attribute::string("name").required(),
            Attribute::string("reference").optional_computed(),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::Groups)
    }

    fn inflate(&self, config: &Record) -> Result<Group> {
        Ok(Group {
            id: Setting::Unset,
            name: config.string("name")?.into(),
            reference: config.string("reference")?.into(),
        })
    }

    fn flatten(&self, group: &Group) -> Record {
        let mut out = Record::new();
        out.set("name", &group.name);
        out.set("reference", &group.reference);
        out
    }

    fn create_unsupported(&self) -> Option<&'static str> {
        Some(CREATE_UNSUPPORTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_group() {
        let group = Groups.decode(json!({"id": 9, "name": "Ops", "reference": null})).unwrap();
        assert_eq!(Groups.flatten(&group).into_value(), json!({"name": "Ops"}));
    }
}
