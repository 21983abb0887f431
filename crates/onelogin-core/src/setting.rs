//! Explicit optional values for API fields.
//!
//! `Setting<T>` distinguishes "not provided" from "provided, possibly as the
//! zero value". API models use it for every nullable field and skip `Unset`
//! fields on serialization:
//!
//! ```ignore
//! #[serde(default, skip_serializing_if = "Setting::is_unset")]
//! pub position: Setting<i32>,
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Setting<T> {
    #[default]
    Unset,
    Set(T),
}

impl<T> Setting<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }

    pub fn as_ref(&self) -> Setting<&T> {
        match self {
            Self::Set(value) => Setting::Set(value),
            Self::Unset => Setting::Unset,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Setting<U> {
        match self {
            Self::Set(value) => Setting::Set(f(value)),
            Self::Unset => Setting::Unset,
        }
    }

    /// Keeps the current value, falling back to `other` when unset.
    pub fn or(self, other: Setting<T>) -> Setting<T> {
        match self {
            Self::Set(_) => self,
            Self::Unset => other,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }
}

impl<T: Default + PartialEq> Setting<T> {
    /// Treats the type's zero value as absent.
    ///
    /// This is the elision rule several OneLogin resources apply to optional
    /// integers and flags: a configured `0` is never sent.
    pub fn non_zero(value: T) -> Self {
        if value == T::default() {
            Self::Unset
        } else {
            Self::Set(value)
        }
    }

    /// Like [`Setting::non_zero`] for an optional input.
    pub fn non_zero_opt(value: Option<T>) -> Self {
        value.map(Self::non_zero).unwrap_or_default()
    }
}

impl Setting<String> {
    /// Treats an empty string as absent.
    pub fn non_empty(value: Option<String>) -> Self {
        match value {
            Some(s) if !s.is_empty() => Self::Set(s),
            _ => Self::Unset,
        }
    }
}

impl<T> From<Option<T>> for Setting<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Unset,
        }
    }
}

impl<T> From<Setting<T>> for Option<T> {
    fn from(value: Setting<T>) -> Self {
        value.into_option()
    }
}

impl<T: Serialize> Serialize for Setting<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Setting::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Payload {
        #[serde(default, skip_serializing_if = "Setting::is_unset")]
        position: Setting<i32>,
        #[serde(default, skip_serializing_if = "Setting::is_unset")]
        enabled: Setting<bool>,
    }

    #[test]
    fn test_zero_can_be_set_explicitly() {
        let payload = Payload {
            position: Setting::Set(0),
            enabled: Setting::Set(false),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"position": 0, "enabled": false})
        );
    }

    #[test]
    fn test_unset_is_skipped() {
        let payload = Payload::default();
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({}));
    }

    #[test]
    fn test_non_zero_elides_default() {
        assert_eq!(Setting::non_zero(0), Setting::<i32>::Unset);
        assert_eq!(Setting::non_zero(7), Setting::Set(7));
        assert_eq!(Setting::non_zero(false), Setting::Unset);
        assert_eq!(Setting::non_zero_opt(None::<i32>), Setting::Unset);
        assert_eq!(Setting::non_empty(Some(String::new())), Setting::Unset);
        assert_eq!(
            Setting::non_empty(Some("x".to_string())),
            Setting::Set("x".to_string())
        );
    }

    #[test]
    fn test_null_deserializes_as_unset() {
        let payload: Payload = serde_json::from_value(json!({"position": null})).unwrap();
        assert_eq!(payload.position, Setting::Unset);
        assert_eq!(payload.enabled, Setting::Unset);

        let payload: Payload = serde_json::from_value(json!({"position": 3})).unwrap();
        assert_eq!(payload.position, Setting::Set(3));
    }

    #[test]
    fn test_or_prefers_set_value() {
        assert_eq!(Setting::Set(1).or(Setting::Set(2)), Setting::Set(1));
        assert_eq!(Setting::Unset.or(Setting::Set(2)), Setting::Set(2));
    }
}
