//! OneLogin resource provider.
//!
//! Maps declarative resource configurations onto OneLogin API objects and
//! reconciles them through create, read, update, delete and import.
//!
//! - [`schema`]: attribute schemas, defaults and validation
//! - [`record`]: the loosely typed configuration and state records
//! - [`controller`]: the CRUD contract and the generic single-collection
//!   controller
//! - [`resources`]: one module per resource type
//! - [`data_source`]: read-only user lookups
//! - [`provider`]: configuration and the type-name registry
//!
//! Every API call goes through [`onelogin_client::OneLoginApi`], so the same
//! controllers run against the HTTP client or the in-memory backend.

pub mod controller;
pub mod data_source;
pub mod error;
pub mod provider;
pub mod record;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod wire;

pub use controller::{Controller, DynController, ResourceController, ResourceMapping};
pub use data_source::{DataSource, DynDataSource};
pub use error::{ProviderError, Result};
pub use provider::{Provider, ResourceRegistry};
pub use record::{DecodeError, Record};
pub use resource::ResourceData;
pub use schema::{Attribute, AttributeType, Schema, ValidationError};
