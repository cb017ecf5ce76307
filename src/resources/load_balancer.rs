//! Load balancers.
//!
//! The load balancer is both a staged resource (syslog servers, interfaces) and
//! the unit that fleet-wide actions and system updates operate on.

use serde::{Deserialize, Serialize};

use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::operation::OperationStatus;
use crate::resources::snapshot::Snapshot;
use crate::staging::config::staged_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBalancer;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerProperties {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub plan_id: String,
}

/// Server-maintained state of a load balancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerObserved {
    /// Monotonic revision, advanced by system updates.
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub revision: u64,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub operation_status: OperationStatus,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub monitoring_status: String,
    pub primary_availability_zone: Option<String>,
    pub active_availability_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogServer {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub ip_address: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub port: u16,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedFixedIp {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub ip_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub network_id: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub virtual_ip_address: String,
    #[serde(deserialize_with = "crate::staging::null_as_default")]
    pub reserved_fixed_ips: Vec<ReservedFixedIp>,
}

staged_config! {
    pub struct LoadBalancerConfig => LoadBalancerPatch {
        pub syslog_servers: Vec<SyslogServer>,
        pub interfaces: Vec<Interface>,
    }
}

impl ResourceKind for LoadBalancer {
    const KIND: Kind = Kind::LoadBalancer;

    type Properties = LoadBalancerProperties;
    type Observed = LoadBalancerObserved;
    type Config = LoadBalancerConfig;

    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str> {
        Some(snapshot.id.as_str())
    }

    fn operation_status(snapshot: &Snapshot<Self>) -> Option<OperationStatus> {
        Some(snapshot.observed.operation_status)
    }
}
