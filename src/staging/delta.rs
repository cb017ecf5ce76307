//! Field-level deltas between desired and remote state.
//!
//! # Responsibilities
//! - Split changes into attribute changes (direct Update) and config changes (staging)
//! - Carry only fields that differ, so out-of-band staged changes are not overwritten
//! - Flag changes to create-only properties, which no update path can apply
//!
//! # Design Decisions
//! - Config is compared against the resolved view, so a field already staged to
//!   the desired value is not sent again
//! - Tags compare as maps (order-insensitive); sequences compare element-wise in order

use serde::Serialize;
use std::collections::BTreeMap;

use crate::resources::attributes::Attributes;
use crate::resources::kind::{PatchOf, ResourceKind};
use crate::resources::snapshot::Desired;
use crate::staging::field::Field;
use crate::staging::status::ResolvedView;
use crate::staging::{StagedConfig, StagedPatch};

/// Changed name/description/tags, sent with a direct Update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeDelta {
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub name: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub tags: Field<BTreeMap<String, String>>,
}

impl AttributeDelta {
    pub fn between(current: &Attributes, desired: &Attributes) -> Self {
        Self {
            name: Field::changed(&current.name, &desired.name),
            description: Field::changed(&current.description, &desired.description),
            tags: Field::changed(&current.tags, &desired.tags),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_unset() && self.description.is_unset() && self.tags.is_unset()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_set() {
            fields.push("name");
        }
        if self.description.is_set() {
            fields.push("description");
        }
        if self.tags.is_set() {
            fields.push("tags");
        }
        fields
    }

    /// Writes every set field into `attributes`.
    pub fn apply_to(&self, attributes: &mut Attributes) {
        if let Field::Set(name) = &self.name {
            attributes.name = name.clone();
        }
        if let Field::Set(description) = &self.description {
            attributes.description = description.clone();
        }
        if let Field::Set(tags) = &self.tags {
            attributes.tags = tags.clone();
        }
    }
}

/// Everything that differs between a desired state and a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta<K: ResourceKind> {
    pub attributes: AttributeDelta,
    pub config: PatchOf<K>,
    /// A create-only property differs; the resource must be replaced instead.
    pub properties_changed: bool,
}

impl<K: ResourceKind> Delta<K> {
    /// Compute the delta from the resolved view to `desired`.
    pub fn build(desired: &Desired<K>, view: &ResolvedView<K>) -> Self {
        Self {
            attributes: AttributeDelta::between(&view.attributes, &desired.attributes),
            config: view.config.diff(&desired.config),
            properties_changed: view.properties != desired.properties,
        }
    }

    /// True when neither attributes nor config differ.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.config.is_empty()
    }

    /// All changed field names, attributes first.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = self.attributes.changed_fields();
        fields.extend(self.config.changed_fields());
        fields
    }
}
