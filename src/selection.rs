//! Selection state: the value currently chosen for every slot of a template

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::template::Template;

/// Rejected selection changes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown slot `{0}`")]
    UnknownKey(String),

    #[error("`{value}` is not an option of slot `{key}`")]
    InvalidOption { key: String, value: String },
}

/// Chosen value per slot for one template instance
///
/// Immutable: [`SelectionState::set`] returns a new state and leaves the
/// receiver untouched, so a rejected change can never leave a half-applied
/// state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    template: Arc<Template>,
    values: BTreeMap<String, String>,
}

impl SelectionState {
    /// Seed every slot with its default value
    pub fn init(template: Arc<Template>) -> Self {
        let values = template
            .slots()
            .map(|slot| (slot.key().to_string(), slot.default_value().to_string()))
            .collect();
        Self { template, values }
    }

    /// The template this state belongs to
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Current value of a slot
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Return a copy with `key` set to `value`
    pub fn set(&self, key: &str, value: &str) -> Result<Self, SelectionError> {
        let slot = self
            .template
            .slot(key)
            .ok_or_else(|| SelectionError::UnknownKey(key.to_string()))?;
        if !slot.offers(value) {
            return Err(SelectionError::InvalidOption {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        let mut next = self.clone();
        next.values.insert(key.to_string(), value.to_string());
        Ok(next)
    }

    /// Iterate `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The question string for the current selections
    pub fn question(&self) -> String {
        crate::question::build(&self.template, self)
    }
}
