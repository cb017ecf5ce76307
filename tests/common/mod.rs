//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use mlb_staging::api::{ApiError, ApiResult, ControlPlane, LoadBalancerActions, RemoteResourceClient};
use mlb_staging::reconcile::ReconcileSettings;
use mlb_staging::resources::load_balancer::LoadBalancerObserved;
use mlb_staging::resources::{
    ActionRequest, Attributes, ConfigurationStatus, Desired, HealthMonitor, Listener, LoadBalancer,
    LoadBalancerConfig, LoadBalancerProperties, OperationHandle, OperationStatus, PatchOf, Policy,
    ResourceKind, Route, Rule, Snapshot, SystemUpdate, TargetGroup,
};
use mlb_staging::staging::{AttributeDelta, StagedConfig};

type ShowHook<K> = Box<dyn FnMut(&mut Snapshot<K>) + Send>;

/// In-memory `RemoteResourceClient` with staging semantics and call counting.
pub struct MemoryClient<K: ResourceKind> {
    store: Mutex<BTreeMap<String, Snapshot<K>>>,
    calls: Mutex<Vec<&'static str>>,
    bodies: Mutex<Vec<(&'static str, serde_json::Value)>>,
    failures: Mutex<HashMap<&'static str, u16>>,
    on_show: Mutex<Option<ShowHook<K>>>,
    /// Delete moves resources to DELETE_STAGED instead of removing them.
    stage_deletes: Mutex<bool>,
    next_id: AtomicUsize,
}

impl<K: ResourceKind> MemoryClient<K> {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            on_show: Mutex::new(None),
            stage_deletes: Mutex::new(false),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn insert(&self, snapshot: Snapshot<K>) {
        self.store.lock().unwrap().insert(snapshot.id.clone(), snapshot);
    }

    pub fn get(&self, id: &str) -> Option<Snapshot<K>> {
        self.store.lock().unwrap().get(id).cloned()
    }

    pub fn modify(&self, id: &str, f: impl FnOnce(&mut Snapshot<K>)) {
        if let Some(snapshot) = self.store.lock().unwrap().get_mut(id) {
            f(snapshot);
        }
    }

    /// Number of calls to `op` (e.g. "create_staged").
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    /// Every call except reads.
    pub fn mutations(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c != "show" && **c != "list")
            .count()
    }

    pub fn call_log(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// JSON of the last request body sent with `op`.
    pub fn last_body(&self, op: &str) -> Option<serde_json::Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(o, _)| *o == op)
            .map(|(_, body)| body.clone())
    }

    fn record_body<T: serde::Serialize>(&self, op: &'static str, body: &T) {
        let value = serde_json::to_value(body).unwrap();
        self.bodies.lock().unwrap().push((op, value));
    }

    /// Make every following `op` call fail with HTTP `status`.
    pub fn fail(&self, op: &'static str, status: u16) {
        self.failures.lock().unwrap().insert(op, status);
    }

    pub fn on_show(&self, hook: impl FnMut(&mut Snapshot<K>) + Send + 'static) {
        *self.on_show.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn stage_deletes(&self) {
        *self.stage_deletes.lock().unwrap() = true;
    }

    /// Promote staged changes of resources owned by `load_balancer_id`.
    pub fn apply_staged(&self, load_balancer_id: &str) {
        let mut store = self.store.lock().unwrap();
        store.retain(|_, s| {
            !(s.load_balancer_id() == Some(load_balancer_id)
                && s.configuration_status == ConfigurationStatus::DeleteStaged)
        });
        for snapshot in store.values_mut() {
            if snapshot.load_balancer_id() != Some(load_balancer_id) {
                continue;
            }
            match (snapshot.configuration_status, snapshot.staged.take()) {
                (ConfigurationStatus::CreateStaged, Some(staged)) => snapshot.active = staged,
                (ConfigurationStatus::UpdateStaged, Some(staged)) => {
                    snapshot.active = snapshot.active.overlay(&staged)
                }
                _ => {}
            }
            snapshot.configuration_status = ConfigurationStatus::Active;
        }
    }

    /// Drop staged changes of resources owned by `load_balancer_id`.
    pub fn cancel_staged_for(&self, load_balancer_id: &str) {
        let mut store = self.store.lock().unwrap();
        for snapshot in store.values_mut() {
            if snapshot.load_balancer_id() == Some(load_balancer_id) {
                snapshot.staged = None;
                snapshot.configuration_status = ConfigurationStatus::Active;
            }
        }
    }

    fn record(&self, op: &'static str, path: &str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(op);
        match self.failures.lock().unwrap().get(op) {
            Some(404) => Err(ApiError::NotFound(path.to_string())),
            Some(status) => Err(ApiError::Status {
                status: *status,
                path: path.to_string(),
                body: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn path(id: &str) -> String {
        format!("{}/{}", K::KIND.collection(), id)
    }

    fn conflict(id: &str, status: ConfigurationStatus) -> ApiError {
        ApiError::Status {
            status: 409,
            path: Self::path(id),
            body: format!("configuration_status is {}", status),
        }
    }
}

#[async_trait]
impl<K: ResourceKind> RemoteResourceClient<K> for MemoryClient<K> {
    async fn show(&self, id: &str) -> ApiResult<Snapshot<K>> {
        self.record("show", &Self::path(id))?;
        let mut store = self.store.lock().unwrap();
        let snapshot = store
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(Self::path(id)))?;
        if let Some(hook) = self.on_show.lock().unwrap().as_mut() {
            hook(snapshot);
        }
        Ok(snapshot.clone())
    }

    async fn list(&self, load_balancer_id: &str) -> ApiResult<Vec<Snapshot<K>>> {
        self.record("list", K::KIND.collection())?;
        let store = self.store.lock().unwrap();
        Ok(store
            .values()
            .filter(|s| s.load_balancer_id() == Some(load_balancer_id))
            .cloned()
            .collect())
    }

    async fn create(&self, desired: &Desired<K>) -> ApiResult<Snapshot<K>> {
        self.record("create", K::KIND.collection())?;
        let id = format!("{}-{}", K::KIND, self.next_id.fetch_add(1, Ordering::SeqCst));
        let snapshot = Snapshot::active(id.clone(), desired.clone());
        self.store.lock().unwrap().insert(id, snapshot.clone());
        Ok(snapshot)
    }

    async fn update(&self, id: &str, delta: &AttributeDelta) -> ApiResult<Snapshot<K>> {
        self.record("update", &Self::path(id))?;
        self.record_body("update", delta);
        let mut store = self.store.lock().unwrap();
        let snapshot = store
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(Self::path(id)))?;
        delta.apply_to(&mut snapshot.attributes);
        Ok(snapshot.clone())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.record("delete", &Self::path(id))?;
        let stage = *self.stage_deletes.lock().unwrap();
        let mut store = self.store.lock().unwrap();
        if stage {
            let snapshot = store
                .get_mut(id)
                .ok_or_else(|| ApiError::NotFound(Self::path(id)))?;
            snapshot.configuration_status = ConfigurationStatus::DeleteStaged;
            Ok(())
        } else {
            store
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| ApiError::NotFound(Self::path(id)))
        }
    }

    async fn create_staged(&self, id: &str, patch: &PatchOf<K>) -> ApiResult<Snapshot<K>> {
        self.record("create_staged", &Self::path(id))?;
        self.record_body("create_staged", patch);
        let mut store = self.store.lock().unwrap();
        let snapshot = store
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(Self::path(id)))?;
        if snapshot.configuration_status != ConfigurationStatus::Active {
            return Err(Self::conflict(id, snapshot.configuration_status));
        }
        let mut staged = snapshot.active.clone();
        staged.apply_patch(patch);
        snapshot.staged = Some(staged);
        snapshot.configuration_status = ConfigurationStatus::CreateStaged;
        Ok(snapshot.clone())
    }

    async fn update_staged(&self, id: &str, patch: &PatchOf<K>) -> ApiResult<Snapshot<K>> {
        self.record("update_staged", &Self::path(id))?;
        self.record_body("update_staged", patch);
        let mut store = self.store.lock().unwrap();
        let snapshot = store
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(Self::path(id)))?;
        if !snapshot.configuration_status.has_staged_changes() {
            return Err(Self::conflict(id, snapshot.configuration_status));
        }
        snapshot
            .staged
            .get_or_insert_with(K::Config::default)
            .apply_patch(patch);
        Ok(snapshot.clone())
    }

    async fn cancel_staged(&self, id: &str) -> ApiResult<()> {
        self.record("cancel_staged", &Self::path(id))?;
        let mut store = self.store.lock().unwrap();
        let snapshot = store
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(Self::path(id)))?;
        snapshot.staged = None;
        snapshot.configuration_status = ConfigurationStatus::Active;
        Ok(())
    }
}

/// How the in-memory load balancer finishes an action.
#[derive(Debug, Clone, Copy)]
pub enum ActionBehavior {
    /// Report PROCESSING for this many shows, then COMPLETE.
    CompleteAfter(usize),
    /// Report PROCESSING for one show, then this status.
    FailWith(OperationStatus),
    /// Report PROCESSING forever.
    Hang,
}

/// Every in-memory client plus the action API, wired together.
pub struct MemoryPlane {
    pub load_balancers: Arc<MemoryClient<LoadBalancer>>,
    pub health_monitors: Arc<MemoryClient<HealthMonitor>>,
    pub listeners: Arc<MemoryClient<Listener>>,
    pub policies: Arc<MemoryClient<Policy>>,
    pub routes: Arc<MemoryClient<Route>>,
    pub rules: Arc<MemoryClient<Rule>>,
    pub target_groups: Arc<MemoryClient<TargetGroup>>,
    pub actions: Arc<MemoryActions>,
}

impl MemoryPlane {
    pub fn new() -> Self {
        let load_balancers = Arc::new(MemoryClient::new());
        let health_monitors = Arc::new(MemoryClient::new());
        let listeners = Arc::new(MemoryClient::new());
        let policies = Arc::new(MemoryClient::new());
        let routes = Arc::new(MemoryClient::new());
        let rules = Arc::new(MemoryClient::new());
        let target_groups = Arc::new(MemoryClient::new());

        let children = Children {
            health_monitors: health_monitors.clone(),
            listeners: listeners.clone(),
            policies: policies.clone(),
            routes: routes.clone(),
            rules: rules.clone(),
            target_groups: target_groups.clone(),
        };
        let actions = Arc::new(MemoryActions {
            load_balancers: load_balancers.clone(),
            children: Arc::new(children),
            requests: Mutex::new(Vec::new()),
            system_updates: Mutex::new(HashMap::new()),
            behavior: Mutex::new(ActionBehavior::CompleteAfter(1)),
        });

        Self {
            load_balancers,
            health_monitors,
            listeners,
            policies,
            routes,
            rules,
            target_groups,
            actions,
        }
    }

    pub fn control_plane(&self) -> ControlPlane {
        ControlPlane {
            load_balancers: self.load_balancers.clone(),
            actions: self.actions.clone(),
            health_monitors: self.health_monitors.clone(),
            listeners: self.listeners.clone(),
            policies: self.policies.clone(),
            routes: self.routes.clone(),
            rules: self.rules.clone(),
            target_groups: self.target_groups.clone(),
        }
    }

    /// Seed an ACTIVE load balancer with a finished previous operation.
    pub fn seed_load_balancer(&self, id: &str, revision: u64) {
        let mut snapshot = Snapshot::active(
            id,
            Desired::<LoadBalancer>::new(
                Attributes::named(id),
                LoadBalancerProperties {
                    plan_id: "plan-50m".into(),
                },
                LoadBalancerConfig::default(),
            ),
        );
        snapshot.observed = LoadBalancerObserved {
            revision,
            operation_status: OperationStatus::Complete,
            monitoring_status: "ACTIVE".into(),
            ..LoadBalancerObserved::default()
        };
        self.load_balancers.insert(snapshot);
    }
}

struct Children {
    health_monitors: Arc<MemoryClient<HealthMonitor>>,
    listeners: Arc<MemoryClient<Listener>>,
    policies: Arc<MemoryClient<Policy>>,
    routes: Arc<MemoryClient<Route>>,
    rules: Arc<MemoryClient<Rule>>,
    target_groups: Arc<MemoryClient<TargetGroup>>,
}

impl Children {
    fn apply_staged(&self, load_balancer_id: &str) {
        self.health_monitors.apply_staged(load_balancer_id);
        self.listeners.apply_staged(load_balancer_id);
        self.policies.apply_staged(load_balancer_id);
        self.routes.apply_staged(load_balancer_id);
        self.rules.apply_staged(load_balancer_id);
        self.target_groups.apply_staged(load_balancer_id);
    }

    fn cancel_staged(&self, load_balancer_id: &str) {
        self.health_monitors.cancel_staged_for(load_balancer_id);
        self.listeners.cancel_staged_for(load_balancer_id);
        self.policies.cancel_staged_for(load_balancer_id);
        self.routes.cancel_staged_for(load_balancer_id);
        self.rules.cancel_staged_for(load_balancer_id);
        self.target_groups.cancel_staged_for(load_balancer_id);
    }
}

/// In-memory action API.
pub struct MemoryActions {
    load_balancers: Arc<MemoryClient<LoadBalancer>>,
    children: Arc<Children>,
    requests: Mutex<Vec<ActionRequest>>,
    system_updates: Mutex<HashMap<String, SystemUpdate>>,
    behavior: Mutex<ActionBehavior>,
}

impl MemoryActions {
    pub fn add_system_update(&self, update: SystemUpdate) {
        self.system_updates.lock().unwrap().insert(update.id.clone(), update);
    }

    pub fn set_behavior(&self, behavior: ActionBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Action bodies received so far.
    pub fn requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LoadBalancerActions for MemoryActions {
    async fn action(&self, load_balancer_id: &str, request: &ActionRequest) -> ApiResult<OperationHandle> {
        self.requests.lock().unwrap().push(request.clone());
        if self.load_balancers.get(load_balancer_id).is_none() {
            return Err(ApiError::NotFound(format!("load_balancers/{}/action", load_balancer_id)));
        }

        let next_revision = match &request.system_update {
            Some(update_ref) => self
                .system_updates
                .lock()
                .unwrap()
                .get(&update_ref.system_update_id)
                .map(|u| u.next_revision),
            None => None,
        };

        self.load_balancers.modify(load_balancer_id, |lb| {
            lb.observed.operation_status = OperationStatus::Processing;
        });

        let behavior = *self.behavior.lock().unwrap();
        let children = self.children.clone();
        let lb_id = load_balancer_id.to_string();
        let apply = request.apply_configurations;
        let cancel = request.cancel_configurations;
        let mut shows = 0usize;

        self.load_balancers.on_show(move |lb| {
            if lb.observed.operation_status != OperationStatus::Processing {
                return;
            }
            shows += 1;
            match behavior {
                ActionBehavior::CompleteAfter(n) if shows > n => {
                    if apply {
                        children.apply_staged(&lb_id);
                        if let Some(staged) = lb.staged.take() {
                            lb.active = lb.active.overlay(&staged);
                        }
                        lb.configuration_status = ConfigurationStatus::Active;
                    }
                    if cancel {
                        children.cancel_staged(&lb_id);
                        lb.staged = None;
                        lb.configuration_status = ConfigurationStatus::Active;
                    }
                    if let Some(revision) = next_revision {
                        lb.observed.revision = revision;
                    }
                    lb.observed.operation_status = OperationStatus::Complete;
                }
                ActionBehavior::FailWith(status) if shows > 1 => {
                    lb.observed.operation_status = status;
                }
                _ => {}
            }
        });

        Ok(OperationHandle {
            load_balancer_id: load_balancer_id.to_string(),
            request: request.clone(),
        })
    }

    async fn show_system_update(&self, id: &str) -> ApiResult<SystemUpdate> {
        self.system_updates
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("system_updates/{}", id)))
    }
}

/// Settings with short budgets and a tight polling cadence.
pub fn fast_settings() -> ReconcileSettings {
    ReconcileSettings {
        create_timeout: Duration::from_secs(2),
        update_timeout: Duration::from_secs(2),
        delete_timeout: Duration::from_secs(2),
        action_timeout: Duration::from_secs(2),
        poll_delay: Duration::ZERO,
        poll_interval: Duration::from_millis(10),
        shutdown: None,
    }
}

/// A request captured by the recording backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Start a programmable backend on a free port that records every request.
pub async fn start_recording_backend<F>(f: F) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let log = recorded.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(&request);
                        log.lock().unwrap().push(request);

                        let response = format!(
                            "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
