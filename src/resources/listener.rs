//! Listeners.

use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::scope::{LoadBalancerScope, NoObserved};
use crate::resources::snapshot::Snapshot;
use crate::staging::config::staged_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener;

staged_config! {
    /// Virtual address and port accepting client traffic.
    pub struct ListenerConfig => ListenerPatch {
        pub ip_address: String,
        pub port: u16,
        pub protocol: String,
    }
}

impl ResourceKind for Listener {
    const KIND: Kind = Kind::Listener;

    type Properties = LoadBalancerScope;
    type Observed = NoObserved;
    type Config = ListenerConfig;

    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str> {
        Some(snapshot.properties.load_balancer_id.as_str())
    }
}
