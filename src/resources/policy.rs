//! Policies.
//!
//! A policy ties a listener to its target groups, health monitor and optional
//! certificate/TLS policy. All of those are weak references by ID.

use serde::{Deserialize, Serialize};

use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::scope::{LoadBalancerScope, NoObserved};
use crate::resources::snapshot::Snapshot;
use crate::staging::config::staged_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy;

/// Certificate selection by SNI server name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerNameIndication {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub server_name: String,
    /// `fixed` or `regular_expression`.
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub input_type: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub priority: u32,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub certificate_id: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub tls_policy_id: String,
}

staged_config! {
    /// Traffic distribution settings of a policy.
    pub struct PolicyConfig => PolicyPatch {
        /// `round-robin`, `weighted-round-robin`, `least-connection`, ...
        pub algorithm: String,
        pub persistence: String,
        pub persistence_timeout: u32,
        pub idle_timeout: u32,
        pub sorry_page_url: String,
        pub source_nat: String,
        pub server_name_indications: Vec<ServerNameIndication>,
        pub certificate_id: String,
        pub health_monitor_id: String,
        pub listener_id: String,
        pub default_target_group_id: String,
        pub backup_target_group_id: String,
        pub tls_policy_id: String,
    }
}

impl ResourceKind for Policy {
    const KIND: Kind = Kind::Policy;

    type Properties = LoadBalancerScope;
    type Observed = NoObserved;
    type Config = PolicyConfig;

    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str> {
        Some(snapshot.properties.load_balancer_id.as_str())
    }
}
