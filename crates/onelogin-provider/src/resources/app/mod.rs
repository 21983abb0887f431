//! `onelogin_apps`, `onelogin_oidc_apps` and `onelogin_saml_apps`.
//!
//! The three resource types share one model and one API collection. They
//! differ in how strictly the `configuration` map is checked and which form
//! the computed `sso` block takes.

pub mod configuration;
pub mod parameters;
pub mod sso;

use async_trait::async_trait;
use indexmap::IndexMap;
use onelogin_client::{Collection, OneLoginApi};
use onelogin_core::{ResourceKind, Setting};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use self::configuration::ConfigurationKind;
use self::parameters::{Parameter, carry_param_ids, flatten_parameters, inflate_parameters};
use self::sso::{Sso, SsoForm};
use crate::controller::ResourceMapping;
use crate::error::{ProviderError, Result};
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provisioning {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub enabled: Setting<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub visible: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub description: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub notes: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub allow_assumed_signin: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub connector_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub brand_id: Setting<i32>,
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::int32_list_setting"
    )]
    pub role_ids: Setting<Vec<i32>>,
    #[serde(default, skip_serializing)]
    pub icon_url: Setting<String>,
    #[serde(default, skip_serializing, deserialize_with = "wire::int32")]
    pub auth_method: Setting<i32>,
    #[serde(default, skip_serializing, deserialize_with = "wire::int32")]
    pub policy_id: Setting<i32>,
    #[serde(default, skip_serializing, deserialize_with = "wire::int32")]
    pub tab_id: Setting<i32>,
    #[serde(default, skip_serializing)]
    pub created_at: Setting<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub provisioning: Setting<Provisioning>,
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "nullable_parameters"
    )]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub configuration: Setting<Map<String, Value>>,
    #[serde(default, skip_serializing)]
    pub sso: Setting<Sso>,
}

fn nullable_parameters<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, Parameter>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IndexMap<String, Parameter>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which of the app resource types a mapping serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFlavor {
    Generic,
    Oidc,
    Saml,
}

pub struct Apps {
    flavor: AppFlavor,
}

impl Apps {
    pub fn new(flavor: AppFlavor) -> Self {
        Self { flavor }
    }

    pub fn flavor(&self) -> AppFlavor {
        self.flavor
    }

    fn inflate_configuration(&self, config: &Record) -> Result<Setting<Map<String, Value>>> {
        let raw = config.object("configuration")?;
        let kind = raw
            .as_ref()
            .map(ConfigurationKind::detect)
            .unwrap_or(ConfigurationKind::Empty);
        match (self.flavor, kind) {
            (AppFlavor::Oidc, k) if k != ConfigurationKind::Oidc => {
                return Err(ProviderError::malformed_block(
                    "configuration",
                    "OIDC apps require redirect_uri",
                ));
            }
            (AppFlavor::Saml, k) if k != ConfigurationKind::Saml => {
                return Err(ProviderError::malformed_block(
                    "configuration",
                    "SAML apps require signature_algorithm",
                ));
            }
            _ => {}
        }
        raw.as_ref()
            .map(configuration::inflate)
            .transpose()
            .map(Setting::from)
    }

    fn sso_form(&self, sso: &Sso) -> Option<SsoForm> {
        match self.flavor {
            AppFlavor::Oidc => Some(SsoForm::Oidc),
            AppFlavor::Saml => Some(SsoForm::Saml),
            AppFlavor::Generic => sso.detect(),
        }
    }
}

#[async_trait]
impl ResourceMapping for Apps {
    type Model = App;

    fn kind(&self) -> ResourceKind {
        match self.flavor {
            AppFlavor::Generic => ResourceKind::Apps,
            AppFlavor::Oidc => ResourceKind::OidcApps,
            AppFlavor::Saml => ResourceKind::SamlApps,
        }
    }

    fn schema(&self) -> Schema {
        let mut configuration = Attribute::map("configuration", AttributeType::String);
        if self.flavor != AppFlavor::Generic {
            configuration = configuration.required();
        }
        Schema::new([
            Attribute::string("name").required(),
            Attribute::bool("visible").default(true),
            Attribute::string("description"),
            Attribute::string("notes").default(""),
            Attribute::bool("allow_assumed_signin").default(false),
            Attribute::int("connector_id").required(),
            Attribute::int("brand_id"),
            Attribute::set("role_ids", AttributeType::Int),
            Attribute::string("icon_url").computed(),
            Attribute::int("auth_method").computed(),
            Attribute::int("policy_id").computed(),
            Attribute::int("tab_id").computed(),
            Attribute::string("created_at").computed(),
            Attribute::string("updated_at").computed(),
            Attribute::block(
                "provisioning",
                Schema::new([Attribute::bool("enabled").required()]),
            ),
            Attribute::blocks("parameters", Parameter::schema()),
            configuration,
            Attribute::block("sso", sso::schema()).computed(),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::Apps)
    }

    fn inflate(&self, config: &Record) -> Result<App> {
        let provisioning = match config.block("provisioning")? {
            Some(block) => Setting::Set(Provisioning {
                enabled: block.bool("enabled")?.into(),
            }),
            None => Setting::Unset,
        };
        Ok(App {
            name: config.string("name")?.into(),
            visible: config.bool("visible")?.into(),
            description: config.string("description")?.into(),
            notes: config.string("notes")?.into(),
            allow_assumed_signin: config.bool("allow_assumed_signin")?.into(),
            connector_id: config.int32("connector_id")?.into(),
            brand_id: Setting::non_zero_opt(config.int32("brand_id")?),
            role_ids: config.int_list("role_ids")?.into(),
            provisioning,
            parameters: inflate_parameters(config)?,
            configuration: self.inflate_configuration(config)?,
            ..App::default()
        })
    }

    fn flatten(&self, app: &App) -> Record {
        let mut out = Record::new();
        out.set("name", &app.name);
        out.set("visible", &app.visible);
        out.set("description", &app.description);
        out.set("notes", &app.notes);
        out.set("allow_assumed_signin", &app.allow_assumed_signin);
        out.set("connector_id", &app.connector_id);
        out.set("brand_id", &app.brand_id);
        out.set("role_ids", &app.role_ids);
        out.set("icon_url", &app.icon_url);
        out.set("auth_method", &app.auth_method);
        out.set("policy_id", &app.policy_id);
        out.set("tab_id", &app.tab_id);
        out.set("created_at", &app.created_at);
        out.set("updated_at", &app.updated_at);

        if let Setting::Set(provisioning) = &app.provisioning {
            let mut block = Record::new();
            block.set("enabled", &provisioning.enabled);
            out.insert_blocks("provisioning", vec![block]);
        }
        if !app.parameters.is_empty() {
            out.insert_blocks("parameters", flatten_parameters(&app.parameters));
        }
        if let Setting::Set(raw) = &app.configuration {
            out.insert("configuration", configuration::flatten(raw).into_value());
        }
        if let Setting::Set(sso) = &app.sso
            && let Some(form) = self.sso_form(sso)
        {
            out.insert_blocks("sso", vec![sso.flatten(form)]);
        }
        out
    }

    async fn update_model(
        &self,
        _api: &dyn OneLoginApi,
        data: &ResourceData,
        config: &Record,
    ) -> Result<App> {
        let mut app = self.inflate(config)?;
        carry_param_ids(&mut app.parameters, data.state());
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use onelogin_client::MemoryApi;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn oidc_config() -> Record {
        record(json!({
            "name": "Portal",
            "connector_id": 108419,
            "visible": true,
            "notes": "",
            "allow_assumed_signin": false,
            "configuration": {
                "redirect_uri": "https://portal.example.com/cb",
                "token_endpoint_auth_method": "1",
                "access_token_expiration_minutes": "60"
            }
        }))
    }

    #[test]
    fn test_oidc_inflate() {
        let mapping = Apps::new(AppFlavor::Oidc);
        let body = mapping.encode(&mapping.inflate(&oidc_config()).unwrap()).unwrap();
        assert_json_eq!(
            body,
            json!({
                "name": "Portal",
                "connector_id": 108419,
                "visible": true,
                "notes": "",
                "allow_assumed_signin": false,
                "configuration": {
                    "redirect_uri": "https://portal.example.com/cb",
                    "token_endpoint_auth_method": 1,
                    "access_token_expiration_minutes": 60
                }
            })
        );
    }

    #[test]
    fn test_oidc_rejects_saml_configuration() {
        let mapping = Apps::new(AppFlavor::Oidc);
        let config = record(json!({
            "name": "x",
            "connector_id": 1,
            "configuration": {"signature_algorithm": "SHA-256"}
        }));
        let err = mapping.inflate(&config).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedBlock { .. }));
        assert!(err.to_string().starts_with("malformed configuration block"));
    }

    #[test]
    fn test_generic_accepts_empty_configuration() {
        let mapping = Apps::new(AppFlavor::Generic);
        let config = record(json!({"name": "x", "connector_id": 1, "configuration": {"audience": "a"}}));
        let app = mapping.inflate(&config).unwrap();
        assert_eq!(app.configuration, Setting::Set(Map::new()));
    }

    #[test]
    fn test_flatten_saml_app() {
        let mapping = Apps::new(AppFlavor::Generic);
        let app = mapping
            .decode(json!({
                "id": 51,
                "name": "Payroll",
                "connector_id": 110016,
                "visible": true,
                "auth_method": 2.0,
                "tab_id": null,
                "role_ids": [3, 4],
                "parameters": {
                    "email": {"id": 812, "label": "Email", "include_in_saml_assertion": true}
                },
                "configuration": {
                    "signature_algorithm": "SHA-256",
                    "certificate_id": 0,
                    "encrypt_assertion": true
                },
                "provisioning": {"enabled": false},
                "sso": {
                    "metadata_url": "https://m",
                    "acs_url": "https://a",
                    "issuer": "https://i",
                    "certificate": {"name": "c", "id": 9, "value": "PEM"}
                }
            }))
            .unwrap();
        let state = mapping.flatten(&app);
        assert_json_eq!(
            state.into_value(),
            json!({
                "name": "Payroll",
                "connector_id": 110016,
                "visible": true,
                "auth_method": 2,
                "role_ids": [3, 4],
                "provisioning": [{"enabled": false}],
                "parameters": [{
                    "param_key_name": "email",
                    "param_id": 812,
                    "label": "Email",
                    "include_in_saml_assertion": true
                }],
                "configuration": {"signature_algorithm": "SHA-256", "encrypt_assertion": "1"},
                "sso": [{
                    "metadata_url": "https://m",
                    "acs_url": "https://a",
                    "issuer": "https://i",
                    "certificate": [{"name": "c", "id": 9, "value": "PEM"}]
                }]
            })
        );
    }

    #[test]
    fn test_oidc_sso_form() {
        let mapping = Apps::new(AppFlavor::Oidc);
        let app = mapping
            .decode(json!({"name": "x", "sso": {"client_id": "cid", "client_secret": "cs"}}))
            .unwrap();
        assert_eq!(
            mapping.flatten(&app).get("sso"),
            Some(&json!([{"client_id": "cid", "client_secret": "cs"}]))
        );
    }

    #[test]
    fn test_schema_defaults() {
        let mapping = Apps::new(AppFlavor::Generic);
        let mut config = record(json!({"name": "x", "connector_id": 1}));
        mapping.schema().apply_defaults(&mut config);
        assert_eq!(config.bool("visible").unwrap(), Some(true));
        assert_eq!(config.string("notes").unwrap().as_deref(), Some(""));
        assert_eq!(config.bool("allow_assumed_signin").unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_update_carries_param_ids() {
        let mapping = Apps::new(AppFlavor::Generic);
        let config = record(json!({
            "name": "x",
            "connector_id": 1,
            "parameters": [{"param_key_name": "email", "label": "E-mail"}]
        }));
        let state = record(json!({"parameters": [{"param_key_name": "email", "param_id": 812}]}));
        let data = ResourceData::new(config.clone()).with_id("51").with_state(state);
        let app = mapping
            .update_model(&MemoryApi::new(), &data, &config)
            .await
            .unwrap();
        assert_eq!(app.parameters["email"].param_id, Setting::Set(812));
    }
}
