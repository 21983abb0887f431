//! `onelogin_self_registration_profiles`
//!
//! Profile fields live in a sub-collection. They are created once the
//! profile exists and reconciled on every update by comparing custom
//! attribute IDs; a failure there leaves the profile in place and is
//! reported as a partial success.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use onelogin_client::{Collection, OneLoginApi, extract_id};
use onelogin_core::validation::{DOMAIN_LIST_STRATEGIES, EMAIL_VERIFICATION_TYPES};
use onelogin_core::{ErrorCategory, ResourceKind, Setting};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::controller::{ResourceMapping, api_failure};
use crate::error::{ProviderError, Result};
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wire;

/// Key some API generations wrap the profile under
const WRAPPER: &str = "self_registration_profile";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileField {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub custom_attribute_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfRegistrationProfile {
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::id")]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub url: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub enabled: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::flag")]
    pub moderated: Setting<bool>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub default_role_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub default_group_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub helptext: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub thankyou_message: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub domain_blacklist: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub domain_whitelist: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub domain_list_strategy: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub email_verification_type: Setting<String>,
    #[serde(default, skip_serializing, deserialize_with = "wire::nullable_list")]
    pub fields: Vec<ProfileField>,
}

fn unwrap_profile(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get(WRAPPER).is_some_and(Value::is_object) => {
            map.remove(WRAPPER).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Custom attribute IDs of the configured fields
fn configured_fields(config: &Record) -> Result<BTreeSet<i32>> {
    let mut ids = BTreeSet::new();
    for block in config.blocks("fields")? {
        ids.insert(block.require_int32("custom_attribute_id")?);
    }
    Ok(ids)
}

pub struct SelfRegistrationProfiles;

impl SelfRegistrationProfiles {
    async fn create_fields(
        &self,
        api: &dyn OneLoginApi,
        profile_id: &str,
        custom_attribute_ids: impl IntoIterator<Item = i32>,
    ) -> Result<()> {
        let collection = Collection::SelfRegistrationProfileFields {
            profile_id: profile_id.to_string(),
        };
        for custom_attribute_id in custom_attribute_ids {
            tracing::info!(
                resource_type = %self.kind(),
                id = profile_id,
                custom_attribute_id,
                "[CREATE] Adding profile field"
            );
            api.create(&collection, &json!({ "custom_attribute_id": custom_attribute_id }))
                .await
                .map_err(|e| {
                    api_failure(self.kind(), ErrorCategory::Create, "adding a field to", profile_id, e)
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceMapping for SelfRegistrationProfiles {
    type Model = SelfRegistrationProfile;

    fn kind(&self) -> ResourceKind {
        ResourceKind::SelfRegistrationProfiles
    }

    fn schema(&self) -> Schema {
        let field = Schema::new([
            Attribute::int("id").computed(),
            Attribute::int("custom_attribute_id").required(),
            Attribute::string("name").computed(),
        ]);
        Schema::new([
            Attribute::string("name").required(),
            Attribute::string("url").required(),
            Attribute::bool("enabled").default(true),
            Attribute::bool("moderated").default(false),
            Attribute::int("default_role_id"),
            Attribute::int("default_group_id"),
            Attribute::string("helptext"),
            Attribute::string("thankyou_message"),
            Attribute::string("domain_blacklist"),
            Attribute::string("domain_whitelist"),
            Attribute::int("domain_list_strategy")
                .default(0)
                .one_of(DOMAIN_LIST_STRATEGIES),
            Attribute::string("email_verification_type")
                .default("Email MagicLink")
                .one_of(EMAIL_VERIFICATION_TYPES),
            Attribute::blocks("fields", field),
        ])
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::SelfRegistrationProfiles)
    }

    fn inflate(&self, config: &Record) -> Result<SelfRegistrationProfile> {
        Ok(SelfRegistrationProfile {
            name: config.string("name")?.into(),
            url: config.string("url")?.into(),
            enabled: config.bool("enabled")?.into(),
            moderated: config.bool("moderated")?.into(),
            default_role_id: config.int32("default_role_id")?.into(),
            default_group_id: config.int32("default_group_id")?.into(),
            helptext: config.string("helptext")?.into(),
            thankyou_message: config.string("thankyou_message")?.into(),
            domain_blacklist: config.string("domain_blacklist")?.into(),
            domain_whitelist: config.string("domain_whitelist")?.into(),
            domain_list_strategy: config.int32("domain_list_strategy")?.into(),
            email_verification_type: config.string("email_verification_type")?.into(),
            ..SelfRegistrationProfile::default()
        })
    }

    fn flatten(&self, profile: &SelfRegistrationProfile) -> Record {
        let mut out = Record::new();
        out.set("name", &profile.name);
        out.set("url", &profile.url);
        out.set("enabled", &profile.enabled);
        out.set("moderated", &profile.moderated);
        out.set("default_role_id", &profile.default_role_id);
        out.set("default_group_id", &profile.default_group_id);
        out.set("helptext", &profile.helptext);
        out.set("thankyou_message", &profile.thankyou_message);
        out.set("domain_blacklist", &profile.domain_blacklist);
        out.set("domain_whitelist", &profile.domain_whitelist);
        out.set("domain_list_strategy", &profile.domain_list_strategy);
        out.set("email_verification_type", &profile.email_verification_type);
        let fields = profile
            .fields
            .iter()
            .map(|field| {
                let mut block = Record::new();
                block.set("id", &field.id);
                block.set("custom_attribute_id", &field.custom_attribute_id);
                block.set("name", &field.name);
                block
            })
            .collect();
        out.insert_blocks("fields", fields);
        out
    }

    fn decode(&self, body: Value) -> Result<SelfRegistrationProfile> {
        serde_json::from_value(unwrap_profile(body)).map_err(ProviderError::response)
    }

    fn response_id(&self, body: &Value) -> Option<String> {
        match body.get(WRAPPER) {
            Some(inner) if inner.is_object() => extract_id(inner),
            _ => extract_id(body),
        }
    }

    async fn after_create(&self, api: &dyn OneLoginApi, config: &Record, id: &str) -> Result<()> {
        self.create_fields(api, id, configured_fields(config)?).await
    }

    async fn after_update(&self, api: &dyn OneLoginApi, config: &Record, id: &str) -> Result<()> {
        let desired = configured_fields(config)?;
        let current = match api.get(&Collection::SelfRegistrationProfiles, id).await {
            Ok(Some(body)) => self.decode(body)?.fields,
            Ok(None) => Vec::new(),
            Err(e) => return Err(api_failure(self.kind(), ErrorCategory::Update, "reading", id, e)),
        };
        let current: BTreeMap<i32, i32> = current
            .iter()
            .filter_map(|f| Some((f.custom_attribute_id.into_option()?, f.id.into_option()?)))
            .collect();

        let fields = Collection::SelfRegistrationProfileFields {
            profile_id: id.to_string(),
        };
        for (custom_attribute_id, field_id) in &current {
            if desired.contains(custom_attribute_id) {
                continue;
            }
            tracing::info!(
                resource_type = %self.kind(),
                id,
                custom_attribute_id,
                "[DELETE] Removing profile field"
            );
            api.delete(&fields, &field_id.to_string()).await.map_err(|e| {
                api_failure(self.kind(), ErrorCategory::Update, "removing a field from", id, e)
            })?;
        }
        let missing: Vec<i32> = desired
            .into_iter()
            .filter(|custom_attribute_id| !current.contains_key(custom_attribute_id))
            .collect();
        self.create_fields(api, id, missing).await
    }
}
