use serde_json::Value;

use crate::record::{DecodeError, Record};

/// One resource instance as handed over by the host framework.
///
/// Holds the identifier, the configuration record of the current call and
/// the state record written by the last read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    config: Record,
    state: Record,
}

impl ResourceData {
    pub fn new(config: Record) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    pub fn with_state(mut self, state: Record) -> Self {
        self.state = state;
        self
    }

    /// The identifier, if set and non-empty
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Marks the instance as gone; the host schedules a recreate.
    pub fn clear_id(&mut self) {
        self.id = None;
        self.state = Record::new();
    }

    pub fn config(&self) -> &Record {
        &self.config
    }

    pub fn set_config(&mut self, config: Record) {
        self.config = config;
    }

    pub fn state(&self) -> &Record {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Record {
        &mut self.state
    }

    pub fn set_state(&mut self, state: Record) {
        self.state = state;
    }

    /// Value from configuration, falling back to state
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.config.get(key).or_else(|| self.state.get(key))
    }

    pub fn lookup_string(&self, key: &str) -> Result<Option<String>, DecodeError> {
        match self.config.string(key)? {
            Some(value) => Ok(Some(value)),
            None => self.state.string(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_id_is_no_id() {
        let data = ResourceData::default().with_id("");
        assert_eq!(data.id(), None);
    }

    #[test]
    fn test_clear_id_drops_state() {
        let mut data = ResourceData::default()
            .with_id("5")
            .with_state(Record::new().with("name", "x"));
        data.clear_id();
        assert_eq!(data.id(), None);
        assert!(data.state().is_empty());
    }

    #[test]
    fn test_lookup_prefers_config() {
        let data = ResourceData::new(Record::new().with("app_id", "1"))
            .with_state(Record::new().with("app_id", "2").with("name", "n"));
        assert_eq!(data.lookup_string("app_id").unwrap().as_deref(), Some("1"));
        assert_eq!(data.lookup("name"), Some(&json!("n")));
    }
}
