//! Health monitors.

use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::scope::{LoadBalancerScope, NoObserved};
use crate::resources::snapshot::Snapshot;
use crate::staging::config::staged_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthMonitor;

staged_config! {
    /// Probe settings applied to every member of the target groups using this monitor.
    pub struct HealthMonitorConfig => HealthMonitorPatch {
        pub port: u16,
        /// `icmp`, `tcp`, `http` or `https`.
        pub protocol: String,
        /// Seconds between probes.
        pub interval: u32,
        pub retry: u32,
        /// Seconds before a probe is considered failed.
        pub timeout: u32,
        /// Request path for http(s) probes.
        pub path: String,
        /// Accepted status codes, e.g. `200-299`.
        pub http_status_code: String,
    }
}

impl ResourceKind for HealthMonitor {
    const KIND: Kind = Kind::HealthMonitor;

    type Properties = LoadBalancerScope;
    type Observed = NoObserved;
    type Config = HealthMonitorConfig;

    fn load_balancer_id(snapshot: &Snapshot<Self>) -> Option<&str> {
        Some(snapshot.properties.load_balancer_id.as_str())
    }
}
