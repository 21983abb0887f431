//! App `configuration` map.
//!
//! Configuration is written as a map of strings. The API expects typed
//! values whose shape depends on the app's protocol: a `redirect_uri` key
//! marks an OIDC app, a `signature_algorithm` key a SAML app.

use onelogin_core::{one_of, validation::SIGNATURE_ALGORITHMS};
use serde_json::{Map, Value};

use crate::error::{ProviderError, Result};
use crate::record::Record;

const BLOCK: &str = "configuration";

const OIDC_INT_KEYS: [&str; 4] = [
    "oidc_application_type",
    "token_endpoint_auth_method",
    "access_token_expiration_minutes",
    "refresh_token_expiration_minutes",
];

/// Protocol a configuration map describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationKind {
    Oidc,
    Saml,
    Empty,
}

impl ConfigurationKind {
    pub fn detect(raw: &Map<String, Value>) -> Self {
        if raw.contains_key("redirect_uri") {
            Self::Oidc
        } else if raw.contains_key("signature_algorithm") {
            Self::Saml
        } else {
            Self::Empty
        }
    }
}

fn get_string(raw: &Map<String, Value>, key: &str) -> Option<String> {
    match raw.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Integer from a string or number; absent and `""` read as 0.
fn get_int(raw: &Map<String, Value>, key: &str) -> Result<i64> {
    let invalid = |value: &Value| {
        ProviderError::malformed_block(BLOCK, format!("{key}: {value} is not an integer"))
    };
    match raw.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::String(s)) if s.is_empty() => Ok(0),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid(&raw[key])),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| invalid(&raw[key])),
        Some(other) => Err(invalid(other)),
    }
}

fn has_content(raw: &Map<String, Value>, key: &str) -> bool {
    match raw.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Configured map to API configuration object.
pub fn inflate(raw: &Map<String, Value>) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    match ConfigurationKind::detect(raw) {
        ConfigurationKind::Oidc => {
            for key in ["redirect_uri", "login_url"] {
                if let Some(value) = get_string(raw, key) {
                    out.insert(key.to_string(), Value::String(value));
                }
            }
            for key in ["oidc_application_type", "token_endpoint_auth_method"] {
                let n = get_int(raw, key)?;
                if n != 0 {
                    out.insert(key.to_string(), n.into());
                }
            }
            for key in [
                "access_token_expiration_minutes",
                "refresh_token_expiration_minutes",
            ] {
                if has_content(raw, key) {
                    out.insert(key.to_string(), get_int(raw, key)?.into());
                }
            }
        }
        ConfigurationKind::Saml => {
            if let Some(Value::String(algorithm)) = raw.get("signature_algorithm") {
                one_of("signature_algorithm", algorithm, SIGNATURE_ALGORITHMS)?;
            }
            for (key, value) in raw {
                if !has_content(raw, key) {
                    continue;
                }
                if key == "certificate_id" {
                    let n = get_int(raw, key)?;
                    if n != 0 {
                        out.insert(key.clone(), n.into());
                    }
                } else {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        ConfigurationKind::Empty => {}
    }
    Ok(out)
}

fn number_string(n: &serde_json::Number) -> String {
    match (n.as_i64(), n.as_f64()) {
        (Some(i), _) => i.to_string(),
        (None, Some(f)) if f.fract() == 0.0 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Null => true,
        _ => false,
    }
}

/// API configuration object to a map of strings.
pub fn flatten(api: &Map<String, Value>) -> Record {
    let mut out = Record::new();
    if api.contains_key("redirect_uri") {
        for key in ["redirect_uri", "login_url"] {
            if let Some(value) = get_string(api, key) {
                out.insert(key, value);
            }
        }
        for key in OIDC_INT_KEYS {
            match api.get(key) {
                Some(value) if is_zero(value) => {}
                Some(Value::Number(n)) => out.insert(key, number_string(n)),
                Some(Value::String(s)) => out.insert(key, s.clone()),
                _ => {}
            }
        }
        return out;
    }

    for (key, value) in api {
        let rendered = match value {
            Value::Null => continue,
            _ if key == "certificate_id" => {
                if is_zero(value) {
                    continue;
                }
                match value {
                    Value::Number(n) => number_string(n),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }
            }
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) => s.clone(),
            Value::Number(n) => number_string(n),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => "0".to_string(),
            other => other.to_string(),
        };
        out.insert(key.clone(), rendered);
    }
    out
}
