//! The client context shared by every reconciliation call.

use std::sync::Arc;

use crate::api::client::{HttpActions, HttpResourceClient, LoadBalancerActions, RemoteResourceClient};
use crate::api::transport::HttpTransport;
use crate::resources::{HealthMonitor, Listener, LoadBalancer, Policy, Route, Rule, TargetGroup};

/// One client per resource kind plus the action API.
///
/// Built once per credential set and read-only afterwards. Cloning is cheap;
/// HTTP-backed clients share one connection pool.
#[derive(Clone)]
pub struct ControlPlane {
    pub load_balancers: Arc<dyn RemoteResourceClient<LoadBalancer>>,
    pub actions: Arc<dyn LoadBalancerActions>,
    pub health_monitors: Arc<dyn RemoteResourceClient<HealthMonitor>>,
    pub listeners: Arc<dyn RemoteResourceClient<Listener>>,
    pub policies: Arc<dyn RemoteResourceClient<Policy>>,
    pub routes: Arc<dyn RemoteResourceClient<Route>>,
    pub rules: Arc<dyn RemoteResourceClient<Rule>>,
    pub target_groups: Arc<dyn RemoteResourceClient<TargetGroup>>,
}

impl ControlPlane {
    /// Build HTTP clients for every kind over one shared transport.
    pub fn over_http(transport: HttpTransport) -> Self {
        Self {
            load_balancers: Arc::new(HttpResourceClient::<LoadBalancer>::new(transport.clone())),
            actions: Arc::new(HttpActions::new(transport.clone())),
            health_monitors: Arc::new(HttpResourceClient::<HealthMonitor>::new(transport.clone())),
            listeners: Arc::new(HttpResourceClient::<Listener>::new(transport.clone())),
            policies: Arc::new(HttpResourceClient::<Policy>::new(transport.clone())),
            routes: Arc::new(HttpResourceClient::<Route>::new(transport.clone())),
            rules: Arc::new(HttpResourceClient::<Rule>::new(transport.clone())),
            target_groups: Arc::new(HttpResourceClient::<TargetGroup>::new(transport)),
        }
    }
}

impl std::fmt::Debug for ControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlane").finish_non_exhaustive()
    }
}
