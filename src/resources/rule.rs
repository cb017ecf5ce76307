//! Rules.
//!
//! Rules belong to a policy; the server derives their load balancer from it.

use serde::{Deserialize, Serialize};

use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::snapshot::Snapshot;
use crate::staging::config::staged_config;
use crate::staging::ZeroValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleProperties {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub policy_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleObserved {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub load_balancer_id: String,
}

/// Request match conditions. Pattern order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConditions {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub path_patterns: Vec<String>,
}

impl ZeroValue for RuleConditions {
    fn is_zero(&self) -> bool {
        self.path_patterns.is_empty()
    }
}

staged_config! {
    pub struct RuleConfig => RulePatch {
        pub priority: u32,
        pub target_group_id: String,
        pub backup_target_group_id: String,
        pub conditions: RuleConditions,
    }
}

impl ResourceKind for Rule {
    const KIND: Kind = Kind::Rule;

    type Properties = RuleProperties;
    type Observed = RuleObserved;
    type Config = RuleConfig;

    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str> {
        let id = snapshot.observed.load_balancer_id.as_str();
        (!id.is_empty()).then_some(id)
    }
}
