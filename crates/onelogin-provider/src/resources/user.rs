//! `onelogin_users`

use async_trait::async_trait;
use indexmap::IndexMap;
use onelogin_client::{Collection, OneLoginApi};
use onelogin_core::{ErrorCategory, ResourceKind, Setting};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::controller::{ResourceMapping, api_failure};
use crate::error::Result;
use crate::record::Record;
use crate::resource::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::wire;

pub(crate) const STRING_FIELDS: [&str; 13] = [
    "username",
    "email",
    "firstname",
    "lastname",
    "distinguished_name",
    "samaccountname",
    "userprincipalname",
    "member_of",
    "phone",
    "title",
    "company",
    "department",
    "comment",
];

pub(crate) const INT_FIELDS: [&str; 8] = [
    "state",
    "status",
    "group_id",
    "directory_id",
    "trusted_idp_id",
    "manager_ad_id",
    "manager_user_id",
    "external_id",
];

pub(crate) const TIMESTAMPS: [&str; 4] = ["created_at", "updated_at", "activated_at", "last_login"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::id",
        serialize_with = "wire::numeric_id"
    )]
    pub id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub username: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub email: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub firstname: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub lastname: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub distinguished_name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub samaccountname: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub userprincipalname: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub member_of: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub phone: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub title: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub company: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub department: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub comment: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub password: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub state: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub status: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub group_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub directory_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub trusted_idp_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub manager_ad_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub manager_user_id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub external_id: Setting<i32>,
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::string_map"
    )]
    pub custom_attributes: Setting<IndexMap<String, String>>,
    #[serde(
        default,
        skip_serializing_if = "Setting::is_unset",
        deserialize_with = "wire::int32_list_setting"
    )]
    pub role_ids: Setting<Vec<i32>>,
    #[serde(default, skip_serializing)]
    pub created_at: Setting<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Setting<String>,
    #[serde(default, skip_serializing)]
    pub activated_at: Setting<String>,
    #[serde(default, skip_serializing)]
    pub last_login: Setting<String>,
}

impl User {
    fn strings_mut(&mut self) -> [&mut Setting<String>; 13] {
        [
            &mut self.username,
            &mut self.email,
            &mut self.firstname,
            &mut self.lastname,
            &mut self.distinguished_name,
            &mut self.samaccountname,
            &mut self.userprincipalname,
            &mut self.member_of,
            &mut self.phone,
            &mut self.title,
            &mut self.company,
            &mut self.department,
            &mut self.comment,
        ]
    }

    fn ints_mut(&mut self) -> [&mut Setting<i32>; 8] {
        [
            &mut self.state,
            &mut self.status,
            &mut self.group_id,
            &mut self.directory_id,
            &mut self.trusted_idp_id,
            &mut self.manager_ad_id,
            &mut self.manager_user_id,
            &mut self.external_id,
        ]
    }

    fn strings(&self) -> [&Setting<String>; 13] {
        [
            &self.username,
            &self.email,
            &self.firstname,
            &self.lastname,
            &self.distinguished_name,
            &self.samaccountname,
            &self.userprincipalname,
            &self.member_of,
            &self.phone,
            &self.title,
            &self.company,
            &self.department,
            &self.comment,
        ]
    }

    fn ints(&self) -> [&Setting<i32>; 8] {
        [
            &self.state,
            &self.status,
            &self.group_id,
            &self.directory_id,
            &self.trusted_idp_id,
            &self.manager_ad_id,
            &self.manager_user_id,
            &self.external_id,
        ]
    }

    fn timestamps(&self) -> [&Setting<String>; 4] {
        [
            &self.created_at,
            &self.updated_at,
            &self.activated_at,
            &self.last_login,
        ]
    }
}

fn string_map_value(map: &IndexMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

pub struct Users;

#[async_trait]
impl ResourceMapping for Users {
    type Model = User;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Users
    }

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            Attribute::string("id"),
            Attribute::string("username").required(),
            Attribute::string("email").required(),
        ];
        attributes.extend(STRING_FIELDS[2..].iter().map(|name| Attribute::string(*name)));
        attributes.push(Attribute::string("password").sensitive());
        attributes.extend(
            INT_FIELDS
                .iter()
                .map(|name| Attribute::int(*name).optional_computed()),
        );
        attributes.push(Attribute::map("custom_attributes", AttributeType::String));
        attributes.push(Attribute::set("role_ids", AttributeType::Int));
        attributes.extend(TIMESTAMPS.iter().map(|name| Attribute::string(*name).computed()));
        Schema::new(attributes)
    }

    fn collection(&self, _data: &ResourceData) -> Result<Collection> {
        Ok(Collection::Users)
    }

    fn inflate(&self, config: &Record) -> Result<User> {
        let mut user = User {
            id: config.lenient_id("id")?.map(|id| id.to_string()).into(),
            password: config.string("password")?.into(),
            custom_attributes: config.string_map("custom_attributes")?.into(),
            role_ids: config.int_list("role_ids")?.into(),
            ..User::default()
        };
        for (name, field) in STRING_FIELDS.iter().zip(user.strings_mut()) {
            *field = config.string(name)?.into();
        }
        for (name, field) in INT_FIELDS.iter().zip(user.ints_mut()) {
            *field = Setting::non_zero_opt(config.int32(name)?);
        }
        Ok(user)
    }

    fn flatten(&self, user: &User) -> Record {
        let mut out = Record::new();
        for (name, field) in STRING_FIELDS.iter().zip(user.strings()) {
            out.set(name, field);
        }
        for (name, field) in INT_FIELDS.iter().zip(user.ints()) {
            out.set(name, field);
        }
        if let Setting::Set(attributes) = &user.custom_attributes {
            out.insert("custom_attributes", string_map_value(attributes));
        }
        out.set("role_ids", &user.role_ids);
        for (name, field) in TIMESTAMPS.iter().zip(user.timestamps()) {
            out.set(name, field);
        }
        out
    }

    /// The password is write-only.
    fn carried_keys(&self) -> &'static [&'static str] {
        &["password"]
    }

    /// Remote custom attributes are kept unless configuration overrides them.
    async fn update_model(
        &self,
        api: &dyn OneLoginApi,
        data: &ResourceData,
        config: &Record,
    ) -> Result<User> {
        let mut user = self.inflate(config)?;
        let id = data.id().unwrap_or_default();
        let remote = match api.get(&Collection::Users, id).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(api_failure(self.kind(), ErrorCategory::Update, "reading", id, e)),
        };
        let remote_attributes = match remote {
            Some(body) => self.decode(body)?.custom_attributes,
            None => Setting::Unset,
        };
        if let Setting::Set(mut merged) = remote_attributes {
            if let Setting::Set(configured) = user.custom_attributes {
                merged.extend(configured);
            }
            user.custom_attributes = Setting::Set(merged);
        }
        Ok(user)
    }
}
