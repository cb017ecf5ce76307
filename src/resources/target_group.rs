//! Target groups.

use serde::{Deserialize, Serialize};

use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::scope::{LoadBalancerScope, NoObserved};
use crate::resources::snapshot::Snapshot;
use crate::staging::config::staged_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetGroup;

/// A backend server receiving traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub ip_address: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub port: u16,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub weight: u32,
}

impl Member {
    pub fn new(ip_address: impl Into<String>, port: u16, weight: u32) -> Self {
        Self {
            ip_address: ip_address.into(),
            port,
            weight,
        }
    }
}

staged_config! {
    pub struct TargetGroupConfig => TargetGroupPatch {
        /// Replaced as a whole when changed.
        pub members: Vec<Member>,
    }
}

impl ResourceKind for TargetGroup {
    const KIND: Kind = Kind::TargetGroup;

    type Properties = LoadBalancerScope;
    type Observed = NoObserved;
    type Config = TargetGroupConfig;

    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str> {
        Some(snapshot.properties.load_balancer_id.as_str())
    }
}
