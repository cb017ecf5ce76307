//! Resource kinds and the per-kind type bundle.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::resources::operation::OperationStatus;
use crate::resources::snapshot::Snapshot;
use crate::staging::StagedConfig;

/// Every resource kind managed through the staging model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    LoadBalancer,
    HealthMonitor,
    Listener,
    Policy,
    Route,
    Rule,
    TargetGroup,
}

impl Kind {
    /// Kinds owned by a load balancer, in fleet-scan order.
    pub const CHILDREN: [Kind; 6] = [
        Kind::HealthMonitor,
        Kind::Listener,
        Kind::Policy,
        Kind::Route,
        Kind::Rule,
        Kind::TargetGroup,
    ];

    /// Envelope key of a single resource on the wire.
    pub fn singular(&self) -> &'static str {
        match self {
            Kind::LoadBalancer => "load_balancer",
            Kind::HealthMonitor => "health_monitor",
            Kind::Listener => "listener",
            Kind::Policy => "policy",
            Kind::Route => "route",
            Kind::Rule => "rule",
            Kind::TargetGroup => "target_group",
        }
    }

    /// Collection path segment and list envelope key.
    pub fn collection(&self) -> &'static str {
        match self {
            Kind::LoadBalancer => "load_balancers",
            Kind::HealthMonitor => "health_monitors",
            Kind::Listener => "listeners",
            Kind::Policy => "policies",
            Kind::Route => "routes",
            Kind::Rule => "rules",
            Kind::TargetGroup => "target_groups",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        [Kind::LoadBalancer]
            .into_iter()
            .chain(Kind::CHILDREN)
            .find(|kind| kind.singular() == normalized || kind.collection() == normalized)
            .ok_or_else(|| format!("unknown resource kind '{}'", s))
    }
}

/// Type bundle describing one resource kind.
///
/// - `Properties`: set at creation, never staged, never changed afterwards
/// - `Observed`: maintained by the server, read-only
/// - `Config`: operational fields that go through staging
pub trait ResourceKind: Debug + Clone + PartialEq + Send + Sync + 'static {
    const KIND: Kind;

    type Properties: Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Observed: Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Config: StagedConfig;

    /// Load balancer owning this resource (the resource's own ID for load balancers).
    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str>;

    /// Status of the asynchronous operation running on the resource, for kinds
    /// whose creation completes in the background.
    fn operation_status(_snapshot: &Snapshot<Self>) -> Option<OperationStatus> {
        None
    }
}

/// Patch type of a kind's staged config.
pub type PatchOf<K> = <<K as ResourceKind>::Config as StagedConfig>::Patch;
