//! Static routes.

use serde::{Deserialize, Serialize};

use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::scope::NoObserved;
use crate::resources::snapshot::Snapshot;
use crate::staging::config::staged_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route;

/// Destination and owner of a route; fixed once created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteProperties {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub destination_cidr: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub load_balancer_id: String,
}

staged_config! {
    pub struct RouteConfig => RoutePatch {
        pub next_hop_ip_address: String,
    }
}

impl ResourceKind for Route {
    const KIND: Kind = Kind::Route;

    type Properties = RouteProperties;
    type Observed = NoObserved;
    type Config = RouteConfig;

    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str> {
        Some(snapshot.properties.load_balancer_id.as_str())
    }
}
