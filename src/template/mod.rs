//! Question templates
//!
//! A template is an ordered list of fragments: literal text interleaved with
//! entity slots the user picks a value for. Definitions come from config
//! files (TOML/JSON) or the built-in [`library`], and are validated once into
//! a [`Template`] before any widget is mounted.
//!
//! The definition format is a plain list, each item either a string or a slot
//! table:
//!
//! ```toml
//! [[templates]]
//! title = "Sub-brand growth"
//! fragments = [
//!     "Which ",
//!     { key = "subBrand", options = ["Oreo", "Milka"], default = "Milka" },
//!     " sub-brand is driving growth in QTD?",
//! ]
//! ```

pub mod library;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// Definitions (unvalidated)
// ============================================================================

/// One item of a template definition, as written by the integrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FragmentDef {
    /// Display text, never selectable
    Literal(String),
    /// A named slot with its candidate values
    Slot(SlotDef),
}

/// Slot definition before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDef {
    pub key: String,
    pub options: Vec<String>,
    /// Initial value; the first option when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A template definition: optional title plus fragments in display order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fragments: Vec<FragmentDef>,
}

impl TemplateDef {
    /// Start an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the card title
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append literal text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(FragmentDef::Literal(text.into()));
        self
    }

    /// Append a slot whose default is its first option
    pub fn slot<I, S>(self, key: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_slot(key.into(), options, None)
    }

    /// Append a slot with an explicit default
    pub fn slot_with_default<I, S>(
        self,
        key: impl Into<String>,
        options: I,
        default: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_slot(key.into(), options, Some(default.into()))
    }

    fn push_slot<I, S>(mut self, key: String, options: I, default: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fragments.push(FragmentDef::Slot(SlotDef {
            key,
            options: options.into_iter().map(Into::into).collect(),
            default,
        }));
        self
    }

    /// Validate into a [`Template`]
    pub fn validate(self) -> Result<Template, ValidationError> {
        validate(self)
    }
}

// ============================================================================
// Validated model
// ============================================================================

/// A fragment of a validated template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Literal { text: String },
    Slot(EntitySlot),
}

/// A validated entity slot: unique key, non-empty options, default among them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySlot {
    key: String,
    options: Vec<String>,
    default: String,
}

impl EntitySlot {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Whether `value` is one of this slot's options
    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

/// A validated question template
///
/// Only constructible through [`validate`], so every instance upholds the
/// slot invariants. Deserializing a `Template` validates as well.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TemplateDef")]
pub struct Template {
    title: Option<String>,
    fragments: Vec<Fragment>,
}

impl Template {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Entity slots in template order
    pub fn slots(&self) -> impl Iterator<Item = &EntitySlot> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Slot(slot) => Some(slot),
            Fragment::Literal { .. } => None,
        })
    }

    /// Look up a slot by key
    pub fn slot(&self, key: &str) -> Option<&EntitySlot> {
        self.slots().find(|s| s.key == key)
    }

    /// Title to show on a card, falling back to the slot keys
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => self
                .slots()
                .map(|s| s.key.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl TryFrom<TemplateDef> for Template {
    type Error = ValidationError;

    fn try_from(def: TemplateDef) -> Result<Self, Self::Error> {
        validate(def)
    }
}

/// Reasons a template definition is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate slot key `{key}`")]
    DuplicateKey { key: String },

    #[error("slot `{key}` has no options")]
    EmptyOptions { key: String },

    #[error("default `{value}` of slot `{key}` is not one of its options")]
    InvalidDefault { key: String, value: String },
}

/// Validate a definition into a [`Template`]
///
/// Checks are applied in fragment order, so the first offending slot is the
/// one reported.
pub fn validate(def: TemplateDef) -> Result<Template, ValidationError> {
    let mut seen = HashSet::new();
    let mut fragments = Vec::with_capacity(def.fragments.len());

    for fragment in def.fragments {
        match fragment {
            FragmentDef::Literal(text) => fragments.push(Fragment::Literal { text }),
            FragmentDef::Slot(SlotDef {
                key,
                options,
                default,
            }) => {
                if !seen.insert(key.clone()) {
                    return Err(ValidationError::DuplicateKey { key });
                }
                let Some(first) = options.first() else {
                    return Err(ValidationError::EmptyOptions { key });
                };
                let default = match default {
                    Some(value) if !options.contains(&value) => {
                        return Err(ValidationError::InvalidDefault { key, value });
                    }
                    Some(value) => value,
                    None => first.clone(),
                };
                fragments.push(Fragment::Slot(EntitySlot {
                    key,
                    options,
                    default,
                }));
            }
        }
    }

    Ok(Template {
        title: def.title,
        fragments,
    })
}
