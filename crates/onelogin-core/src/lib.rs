pub mod error;
pub mod id;
pub mod resource;
pub mod setting;
pub mod validation;

pub use error::{CoreError, ErrorCategory, Result, format_error, is_not_found_message};
pub use id::{parse_id, parse_id_lenient, parse_nested_import_id, require_id};
pub use resource::ResourceKind;
pub use setting::Setting;
pub use validation::one_of;
