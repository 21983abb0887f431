//! Read-only lookups: `onelogin_user` and `onelogin_users`.
//!
//! Data sources share the user flattener with the `onelogin_users` resource
//! but never write to the API. Both query `GET /api/2/users` with filters
//! taken from configuration.

use std::sync::Arc;

use async_trait::async_trait;
use onelogin_client::{ApiError, Collection, OneLoginApi, extract_id};
use onelogin_core::ErrorCategory;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::controller::{ResourceMapping, prepare_config};
use crate::error::{ProviderError, Result};
use crate::record::Record;
use crate::resource::ResourceData;
use crate::resources::Users;
use crate::resources::user::{INT_FIELDS, STRING_FIELDS, TIMESTAMPS};
use crate::schema::{Attribute, AttributeType, Schema, ValidationError};

/// Read entry point of one data source
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Runs the lookup and writes the result into state.
    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()>;
}

pub type DynDataSource = Arc<dyn DataSource>;

/// Every data source the provider serves
pub fn data_sources() -> Vec<DynDataSource> {
    vec![Arc::new(UserLookup), Arc::new(UserSearch)]
}

type Query = Vec<(String, String)>;

fn push_string(query: &mut Query, config: &Record, key: &str, param: &str) -> Result<()> {
    if let Some(value) = config.string(key)?.filter(|v| !v.is_empty()) {
        query.push((param.to_string(), value));
    }
    Ok(())
}

fn push_int(query: &mut Query, config: &Record, key: &str) -> Result<()> {
    if let Some(value) = config.int(key)?.filter(|v| *v != 0) {
        query.push((key.to_string(), value.to_string()));
    }
    Ok(())
}

fn constraint(message: &str) -> ProviderError {
    ProviderError::Validation(vec![ValidationError::Constraint(message.to_string())])
}

async fn query_users(
    api: &dyn OneLoginApi,
    type_name: &'static str,
    query: &Query,
) -> Result<Vec<Value>> {
    api.list(&Collection::Users, query).await.map_err(|e: ApiError| {
        tracing::error!(
            data_source = type_name,
            error = %e,
            "[ERROR] There was a problem reading the user"
        );
        ProviderError::api(ErrorCategory::Read, type_name, "reading", "", e)
    })
}

/// `onelogin_user`: exactly one user by ID or username
pub struct UserLookup;

#[async_trait]
impl DataSource for UserLookup {
    fn type_name(&self) -> &'static str {
        "onelogin_user"
    }

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            Attribute::string("user_id"),
            Attribute::string("username").optional_computed(),
        ];
        attributes.extend(
            STRING_FIELDS[1..]
                .iter()
                .map(|name| Attribute::string(*name).computed()),
        );
        attributes.extend(INT_FIELDS.iter().map(|name| Attribute::int(*name).computed()));
        attributes.push(Attribute::map("custom_attributes", AttributeType::String).computed());
        attributes.push(Attribute::set("role_ids", AttributeType::Int).computed());
        attributes.extend(TIMESTAMPS.iter().map(|name| Attribute::string(*name).computed()));
        Schema::new(attributes)
    }

    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let config = prepare_config(&self.schema(), data.config())?;
        let mut query = Query::new();
        push_string(&mut query, &config, "user_id", "user_ids")?;
        push_string(&mut query, &config, "username", "username")?;
        if query.is_empty() {
            return Err(constraint(
                "At least one of either username or user_id must be defined",
            ));
        }

        let mut users = query_users(api, self.type_name(), &query).await?;
        match users.len() {
            0 => {
                tracing::warn!(
                    data_source = self.type_name(),
                    "[WARNING] No user returned by the query"
                );
                data.clear_id();
                Ok(())
            }
            1 => {
                let body = users.remove(0);
                let id = extract_id(&body)
                    .ok_or_else(|| ProviderError::response("user in query result carried no id"))?;
                let user = Users.decode(body)?;
                let mut state = Users.flatten(&user);
                state.insert("user_id", id.clone());
                data.set_id(id);
                data.set_state(state);
                Ok(())
            }
            count => {
                tracing::warn!(
                    data_source = self.type_name(),
                    count,
                    "[WARNING] Query matched several users"
                );
                data.clear_id();
                Err(constraint(
                    "Your query returned more than one result. Usernames and IDs should be unique",
                ))
            }
        }
    }
}

/// Keys copied into each entry of the `users` list
const SUMMARY_FIELDS: [&str; 8] = [
    "username",
    "email",
    "firstname",
    "lastname",
    "samaccountname",
    "external_id",
    "directory_id",
    "last_login",
];

/// `onelogin_users`: every user matching the configured filters
pub struct UserSearch;

impl UserSearch {
    fn query(config: &Record) -> Result<Query> {
        let mut query = Query::new();
        push_string(&mut query, config, "user_id", "user_ids")?;
        for key in ["username", "firstname", "lastname", "samaccountname"] {
            push_string(&mut query, config, key, key)?;
        }
        push_int(&mut query, config, "directory_id")?;
        push_int(&mut query, config, "external_id")?;
        Ok(query)
    }

    /// Stable identifier of a query
    fn query_id(query: &Query) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(query)?);
        Ok(hex::encode(hasher.finalize()))
    }
}

#[async_trait]
impl DataSource for UserSearch {
    fn type_name(&self) -> &'static str {
        "onelogin_users"
    }

    fn schema(&self) -> Schema {
        let summary = Schema::new([
            Attribute::string("username"),
            Attribute::string("email"),
            Attribute::string("firstname"),
            Attribute::string("lastname"),
            Attribute::string("samaccountname"),
            Attribute::int("external_id"),
            Attribute::int("directory_id"),
            Attribute::string("last_login"),
        ]);
        Schema::new([
            Attribute::string("user_id"),
            Attribute::string("username"),
            Attribute::string("firstname"),
            Attribute::string("lastname"),
            Attribute::string("samaccountname"),
            Attribute::int("directory_id"),
            Attribute::int("external_id"),
            Attribute::list("ids", AttributeType::String).computed(),
            Attribute::blocks("users", summary).computed(),
        ])
    }

    async fn read(&self, api: &dyn OneLoginApi, data: &mut ResourceData) -> Result<()> {
        let config = prepare_config(&self.schema(), data.config())?;
        let query = Self::query(&config)?;
        let users = query_users(api, self.type_name(), &query).await?;
        if users.is_empty() {
            tracing::warn!(
                data_source = self.type_name(),
                "[WARNING] No users returned by the query"
            );
            data.clear_id();
            return Ok(());
        }
        tracing::info!(
            data_source = self.type_name(),
            count = users.len(),
            "[READ] Users returned"
        );

        let mut ids = Vec::with_capacity(users.len());
        let mut summaries = Vec::with_capacity(users.len());
        for body in users {
            if let Some(id) = extract_id(&body) {
                ids.push(id);
            }
            let flat = Users.flatten(&Users.decode(body)?);
            let mut summary = Record::new();
            for key in SUMMARY_FIELDS {
                if let Some(value) = flat.get(key) {
                    summary.insert(key, value.clone());
                }
            }
            summaries.push(summary);
        }

        let mut state = Record::new();
        state.insert("ids", ids);
        state.insert_blocks("users", summaries);
        data.set_id(Self::query_id(&query)?);
        data.set_state(state);
        Ok(())
    }
}
