//! Cosmetic attributes shared by every resource kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name, description and tags.
///
/// Attributes apply immediately and never go through staging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub tags: BTreeMap<String, String>,
}

impl Attributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}
