//! `onelogin_auth_servers`

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
pub struct AuthServerConfiguration {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub resource_identifier: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub audiences: Setting<Vec<String>>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub access_token_expiration_minutes: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub refresh_token_expiration_minutes: Setting<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthServer {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub description: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub configuration: Setting<AuthServerConfiguration>,
}

pub struct AuthServers;

impl ResourceMapping for AuthServers {
    type Model = AuthServer;

    fn kind(&self) -> ResourceKind {
        ResourceKind::AuthServers
    }

    fn schema(&self) -> Schema {
        Schema::new([
            Attribute::string("name").required(),
            Attribute::string("description").required(),
            Attribute::block(
                "configuration",
                Schema::new([
                    Attribute::string("resource_identifier").required(),
                    Attribute::list("audiences", AttributeType::String).required(),
                    Attribute::int("access_token_expiration_minutes").optional_computed(),
                    Attribute::int("refresh_token_expiration_minutes").optional_computed(),
                ]),
            )
            .required(),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::AuthServers)
    }

    fn inflate(&self, config: &Record) -> Result<AuthServer> {
        let configuration = match config.block("configuration")? {
            Some(block) => Setting::Set(AuthServerConfiguration {
                resource_identifier: block.string("resource_identifier")?.into(),
                audiences: block.string_list("audiences")?.into(),
                access_token_expiration_minutes: block
                    .int32("access_token_expiration_minutes")?
                    .into(),
                refresh_token_expiration_minutes: block
                    .int32("refresh_token_expiration_minutes")?
                    .into(),
            }),
            None => Setting::Unset,
        };
        Ok(AuthServer {
            id: Setting::Unset,
            name: config.string("name")?.into(),
            description: config.string("description")?.into(),
            configuration,
        })
    }

    fn flatten(&self, server: &AuthServer) -> Record {
        let mut out = Record::new();
        out.set("name", &server.name);
        out.set("description", &server.description);
        if let Setting::Set(conf) = &server.configuration {
            let mut block = Record::new();
            block.set("resource_identifier", &conf.resource_identifier);
            block.set("audiences", &conf.audiences);
            block.set(
                "access_token_expiration_minutes",
                &conf.access_token_expiration_minutes,
            );
            block.set(
                "refresh_token_expiration_minutes",
                &conf.refresh_token_expiration_minutes,
            );
            out.insert_blocks("configuration", vec![block]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let config = Record::from_value(json!({
            "name": "Contacts API",
            "description": "contacts",
            "configuration": [{
                "resource_identifier": "https://contacts.example.com",
                "audiences": ["contacts"],
                "access_token_expiration_minutes": 10
            }]
        }))
        .unwrap();
        let server = AuthServers.inflate(&config).unwrap();
        let body = AuthServers.encode(&server).unwrap();
        assert_json_eq!(
            body,
            json!({
                "name": "Contacts API",
                "description": "contacts",
                "configuration": {
                    "resource_identifier": "https://contacts.example.com",
                    "audiences": ["contacts"],
                    "access_token_expiration_minutes": 10
                }
            })
        );
        let read = AuthServers.decode(body).unwrap();
        assert_json_eq!(AuthServers.flatten(&read).into_value(), config.into_value());
    }

    #[test]
    fn test_configuration_required() {
        let errors = AuthServers
            .schema()
            .validate(&Record::from_value(json!({"name": "a", "description": "b"})).unwrap())
            .unwrap_err();
        assert_eq!(errors[0].to_string(), "configuration is required");
    }
}
