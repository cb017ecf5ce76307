//! Field sets shared by several child kinds.

use serde::{Deserialize, Serialize};

/// Create-only link from a child resource to its load balancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerScope {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub load_balancer_id: String,
}

impl LoadBalancerScope {
    pub fn new(load_balancer_id: impl Into<String>) -> Self {
        Self {
            load_balancer_id: load_balancer_id.into(),
        }
    }
}

/// Kinds without server-maintained fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoObserved {}
