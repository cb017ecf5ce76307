//! Remote snapshots and desired state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resources::attributes::Attributes;
use crate::resources::kind::ResourceKind;

/// Staging state of a resource's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationStatus {
    /// Configuration matches the live data plane.
    Active,
    /// A complete new configuration is pending.
    CreateStaged,
    /// A sparse overlay of changes is pending.
    UpdateStaged,
    /// Deletion is pending; the resource is logically absent.
    DeleteStaged,
}

impl ConfigurationStatus {
    pub fn is_active(self) -> bool {
        self == ConfigurationStatus::Active
    }

    /// True when a CREATE/UPDATE overlay exists that further changes can merge into.
    pub fn has_staged_changes(self) -> bool {
        matches!(
            self,
            ConfigurationStatus::CreateStaged | ConfigurationStatus::UpdateStaged
        )
    }
}

impl fmt::Display for ConfigurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigurationStatus::Active => "ACTIVE",
            ConfigurationStatus::CreateStaged => "CREATE_STAGED",
            ConfigurationStatus::UpdateStaged => "UPDATE_STAGED",
            ConfigurationStatus::DeleteStaged => "DELETE_STAGED",
        };
        f.write_str(s)
    }
}

/// A resource as last returned by the remote API.
///
/// `active` holds the live values. `staged` is present only while a change is
/// pending: total for CREATE_STAGED, sparse for UPDATE_STAGED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<K: ResourceKind> {
    pub id: String,
    pub configuration_status: ConfigurationStatus,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(flatten)]
    pub properties: K::Properties,
    #[serde(flatten)]
    pub observed: K::Observed,
    #[serde(flatten)]
    pub active: K::Config,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged: Option<K::Config>,
}

impl<K: ResourceKind> Snapshot<K> {
    /// A fresh ACTIVE snapshot with default server-side state.
    pub fn active(id: impl Into<String>, desired: Desired<K>) -> Self {
        Self {
            id: id.into(),
            configuration_status: ConfigurationStatus::Active,
            attributes: desired.attributes,
            properties: desired.properties,
            observed: K::Observed::default(),
            active: desired.config,
            staged: None,
        }
    }

    pub fn load_balancer_id(&self) -> Option<&str> {
        K::load_balancer_id(self)
    }
}

/// Caller-declared configuration of one resource.
///
/// Serialized as-is for `Create`; server-owned fields are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Desired<K: ResourceKind> {
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(flatten)]
    pub properties: K::Properties,
    #[serde(flatten)]
    pub config: K::Config,
}

impl<K: ResourceKind> Desired<K> {
    pub fn new(attributes: Attributes, properties: K::Properties, config: K::Config) -> Self {
        Self {
            attributes,
            properties,
            config,
        }
    }
}
