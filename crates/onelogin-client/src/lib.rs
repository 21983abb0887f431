//! OneLogin REST API adapter.
//!
//! [`OneLoginApi`] is the single boundary between resource controllers and
//! the remote service. Two implementations ship with the crate:
//!
//! - [`HttpClient`]: reqwest client authenticated through the OAuth2
//!   client-credentials flow at `<base-url>/auth/oauth2/v2/token`
//! - [`MemoryApi`]: concurrent in-memory backend for tests and dry runs

pub mod api;
pub mod auth;
pub mod collection;
pub mod error;
pub mod http;
pub mod memory;

pub use api::{DynApi, OneLoginApi, extract_id};
pub use collection::Collection;
pub use error::{ApiError, ApiResult};
pub use http::HttpClient;
pub use memory::{MemoryApi, MemoryOp};
