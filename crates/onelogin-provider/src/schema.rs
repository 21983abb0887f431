//! Attribute tables for resource types.
//!
//! A [`Schema`] lists every configuration attribute of a resource with its
//! type and mode. Controllers apply declared defaults and validate the
//! configuration against it before inflating.

use indexmap::IndexMap;
use onelogin_core::one_of;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::{Record, as_int, kind_name};

/// The type of an attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Nested records with their own schema
    Block {
        schema: Schema,
        max_items: Option<usize>,
    },
}

impl AttributeType {
    pub fn list(element: AttributeType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: AttributeType) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn map(element: AttributeType) -> Self {
        Self::Map(Box::new(element))
    }

    /// Short name shown in attribute tables and errors
    pub fn name(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Int => "int".to_string(),
            Self::Bool => "bool".to_string(),
            Self::List(elem) => format!("list({})", elem.name()),
            Self::Set(elem) => format!("set({})", elem.name()),
            Self::Map(elem) => format!("map({})", elem.name()),
            Self::Block {
                max_items: Some(1),
                ..
            } => "block".to_string(),
            Self::Block { .. } => "list(block)".to_string(),
        }
    }
}

/// How an attribute may be supplied
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Required,
    Optional,
    /// Optional; the default is sent when the attribute is absent.
    OptionalDefault(Value),
    /// Optional; the service fills it in when absent.
    OptionalComputed,
    /// Set by the service only
    Computed,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional | Self::OptionalDefault(_) => "optional",
            Self::OptionalComputed => "optional, computed",
            Self::Computed => "computed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeType,
    pub mode: Mode,
    pub allowed: Option<&'static [&'static str]>,
    pub sensitive: bool,
    pub force_new: bool,
    pub deprecated: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl Attribute {
    pub fn new(name: &'static str, kind: AttributeType) -> Self {
        Self {
            name,
            kind,
            mode: Mode::Optional,
            allowed: None,
            sensitive: false,
            force_new: false,
            deprecated: None,
            description: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, AttributeType::Int)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &'static str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::list(element))
    }

    pub fn set(name: &'static str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::set(element))
    }

    pub fn map(name: &'static str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::map(element))
    }

    /// A repeatable nested block
    pub fn blocks(name: &'static str, schema: Schema) -> Self {
        Self::new(
            name,
            AttributeType::Block {
                schema,
                max_items: None,
            },
        )
    }

    /// A nested block that appears at most once
    pub fn block(name: &'static str, schema: Schema) -> Self {
        Self::new(
            name,
            AttributeType::Block {
                schema,
                max_items: Some(1),
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.mode = Mode::Required;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.mode = Mode::OptionalDefault(value.into());
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.mode = Mode::OptionalComputed;
        self
    }

    pub fn computed(mut self) -> Self {
        self.mode = Mode::Computed;
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// A configuration value rejected by the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(String),

    #[error("{field}: expected {expected}, got {found}")]
    Type {
        field: String,
        expected: String,
        found: &'static str,
    },

    /// Carries the enumerated-value message unchanged.
    #[error("{0}")]
    NotAllowed(String),

    #[error("{0} is computed and cannot be configured")]
    Computed(String),

    #[error("{field}: at most {max} block(s) allowed, got {count}")]
    TooManyBlocks {
        field: String,
        max: usize,
        count: usize,
    },

    #[error("{0}: unsupported attribute")]
    Unknown(String),

    /// A rule spanning several attributes
    #[error("{0}")]
    Constraint(String),
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }
}

/// Ordered attribute table of one resource type or nested block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    attributes: IndexMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            attributes: attributes.into_iter().map(|a| (a.name, a)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Inserts declared defaults for absent attributes, including inside
    /// nested blocks.
    pub fn apply_defaults(&self, record: &mut Record) {
        if let Value::Object(mut map) = record.to_value() {
            self.apply_defaults_map(&mut map);
            *record = Record::from_map(map);
        }
    }

    fn apply_defaults_map(&self, map: &mut Map<String, Value>) {
        for attr in self.iter() {
            let present = map.get(attr.name).is_some_and(|v| !v.is_null());
            match (&attr.mode, &attr.kind, present) {
                (Mode::OptionalDefault(default), _, false) => {
                    map.insert(attr.name.to_string(), default.clone());
                }
                (_, AttributeType::Block { schema, .. }, true) => {
                    match map.get_mut(attr.name) {
                        Some(Value::Object(block)) => schema.apply_defaults_map(block),
                        Some(Value::Array(items)) => {
                            for item in items {
                                if let Value::Object(block) = item {
                                    schema.apply_defaults_map(block);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    /// Checks presence, types and allowed values.
    ///
    /// All problems are collected rather than stopping at the first one.
    pub fn validate(&self, record: &Record) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Value::Object(map) = record.to_value() {
            self.validate_map(&map, "", &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_map(&self, map: &Map<String, Value>, prefix: &str, errors: &mut Vec<ValidationError>) {
        let path = |name: &str| {
            if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            }
        };

        for key in map.keys() {
            if self.get(key).is_none() {
                errors.push(ValidationError::Unknown(path(key)));
            }
        }

        for attr in self.iter() {
            let value = map.get(attr.name).filter(|v| !v.is_null());
            let Some(value) = value else {
                if attr.mode == Mode::Required {
                    errors.push(ValidationError::Missing(path(attr.name)));
                }
                continue;
            };
            if attr.mode == Mode::Computed {
                errors.push(ValidationError::Computed(path(attr.name)));
                continue;
            }
            check_type(&attr.kind, value, &path(attr.name), errors);

            if let Some(allowed) = attr.allowed {
                let rendered = match value {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(
                        as_int(value).map_or_else(|| n.to_string(), |i| i.to_string()),
                    ),
                    _ => None,
                };
                if let Some(rendered) = rendered
                    && let Err(e) = one_of(attr.name, &rendered, allowed)
                {
                    errors.push(ValidationError::NotAllowed(e.to_string()));
                }
            }
        }
    }
}

fn check_type(kind: &AttributeType, value: &Value, field: &str, errors: &mut Vec<ValidationError>) {
    let mismatch = |errors: &mut Vec<ValidationError>| {
        errors.push(ValidationError::Type {
            field: field.to_string(),
            expected: kind.name(),
            found: kind_name(value),
        })
    };

    match (kind, value) {
        (AttributeType::String, Value::String(_)) => {}
        (AttributeType::Bool, Value::Bool(_)) => {}
        (AttributeType::Int, Value::Number(n)) => {
            let integral = n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0);
            if !integral {
                mismatch(errors);
            }
        }
        (AttributeType::List(elem) | AttributeType::Set(elem), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_type(elem, item, &format!("{field}.{i}"), errors);
            }
        }
        (AttributeType::Map(elem), Value::Object(entries)) => {
            for (key, item) in entries {
                check_type(elem, item, &format!("{field}.{key}"), errors);
            }
        }
        (AttributeType::Block { schema, .. }, Value::Object(block)) => {
            schema.validate_map(block, field, errors);
        }
        (AttributeType::Block { schema, max_items }, Value::Array(items)) => {
            if let Some(max) = max_items
                && items.len() > *max
            {
                errors.push(ValidationError::TooManyBlocks {
                    field: field.to_string(),
                    max: *max,
                    count: items.len(),
                });
            }
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(block) => {
                        schema.validate_map(block, &format!("{field}.{i}"), errors)
                    }
                    other => errors.push(ValidationError::Type {
                        field: format!("{field}.{i}"),
                        expected: "block".to_string(),
                        found: kind_name(other),
                    }),
                }
            }
        }
        _ => mismatch(errors),
    }
}
