//! Fleet-wide apply and system updates.
//!
//! # Responsibilities
//! - Scan a load balancer and all of its children for pending staged changes
//! - Gate system updates on the load balancer's revision
//! - Issue at most one Action call, then wait for the operation to complete
//!
//! # Design Decisions
//! - Check before acting: the Action API is not a safe no-op, so a converged
//!   fleet or an already-applied update never reaches it
//! - The scan's reads run concurrently; the action waits for all of them
//! - Apply and system update share one Action body when both are needed
//! - Failures carry the list of resources that were not ACTIVE

use serde::Serialize;

use crate::api::control_plane::ControlPlane;
use crate::observability::metrics;
use crate::reconcile::error::{PendingChange, PendingReport, ReconcileError, ReconcileResult};
use crate::reconcile::ReconcileSettings;
use crate::resources::kind::{Kind, ResourceKind};
use crate::resources::load_balancer::LoadBalancer;
use crate::resources::operation::{ActionRequest, OperationStatus};
use crate::resources::snapshot::{ConfigurationStatus, Snapshot};
use crate::resources::system_update::{RevisionGate, SystemUpdateRef};

/// State of a load balancer and its children at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetScan {
    pub load_balancer: Snapshot<LoadBalancer>,
    /// Every resource, the load balancer included, that is not ACTIVE.
    pub pending: PendingReport,
}

impl FleetScan {
    /// True when nothing is waiting to be applied.
    pub fn is_converged(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Result of a reconcile or cancel call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    /// Load balancer after the action completed, or as scanned when no action was needed.
    /// `None` only when nothing was requested.
    pub load_balancer: Option<Snapshot<LoadBalancer>>,
    /// Actions sent in the Action call; empty for a no-op.
    pub actions: Vec<&'static str>,
    /// Resources that were not ACTIVE before the action.
    pub pending: PendingReport,
}

impl OperationResult {
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }

    /// Revision after the call, when the load balancer was read.
    pub fn revision(&self) -> Option<u64> {
        self.load_balancer.as_ref().map(|lb| lb.observed.revision)
    }
}

/// Drives fleet-wide actions on load balancers.
#[derive(Debug, Clone)]
pub struct ApplyOrchestrator {
    plane: ControlPlane,
    settings: ReconcileSettings,
}

impl ApplyOrchestrator {
    pub fn new(plane: ControlPlane, settings: ReconcileSettings) -> Self {
        Self { plane, settings }
    }

    /// Apply pending staged changes and/or a system update.
    pub async fn reconcile(
        &self,
        load_balancer_id: &str,
        want_apply: bool,
        system_update: Option<&SystemUpdateRef>,
    ) -> ReconcileResult<OperationResult> {
        let mut request = ActionRequest::default();
        let mut pending = PendingReport::default();
        let mut load_balancer = None;

        if want_apply {
            let scan = self.scan(load_balancer_id).await?;
            if scan.is_converged() {
                tracing::info!(load_balancer_id = %load_balancer_id, "Fleet converged; nothing to apply");
            } else {
                tracing::info!(
                    load_balancer_id = %load_balancer_id,
                    pending = %scan.pending,
                    "Staged changes pending"
                );
                request.apply_configurations = true;
            }
            pending = scan.pending;
            load_balancer = Some(scan.load_balancer);
        }

        if let Some(update_ref) = system_update {
            let current = match load_balancer.take() {
                Some(snapshot) => snapshot,
                None => self.show_load_balancer(load_balancer_id).await?,
            };
            let update = self
                .plane
                .actions
                .show_system_update(&update_ref.system_update_id)
                .await?;

            let revision = current.observed.revision;
            match update.gate(revision) {
                RevisionGate::AlreadyApplied => {
                    tracing::info!(
                        load_balancer_id = %load_balancer_id,
                        system_update_id = %update.id,
                        revision,
                        "System update already applied"
                    );
                }
                RevisionGate::Applicable => {
                    tracing::info!(
                        load_balancer_id = %load_balancer_id,
                        system_update_id = %update.id,
                        from = update.current_revision,
                        to = update.next_revision,
                        "System update required"
                    );
                    request.system_update = Some(update_ref.clone());
                }
                RevisionGate::OutOfOrder => {
                    return Err(ReconcileError::RevisionMismatch {
                        load_balancer_id: load_balancer_id.to_string(),
                        system_update_id: update_ref.system_update_id.clone(),
                        revision,
                        current_revision: update.current_revision,
                        next_revision: update.next_revision,
                    });
                }
            }
            load_balancer = Some(current);
        }

        if request.is_empty() {
            return Ok(OperationResult {
                load_balancer,
                actions: Vec::new(),
                pending,
            });
        }

        self.execute(load_balancer_id, request, pending).await
    }

    /// Discard every pending staged change on the fleet.
    pub async fn cancel(&self, load_balancer_id: &str) -> ReconcileResult<OperationResult> {
        let scan = self.scan(load_balancer_id).await?;
        if scan.is_converged() {
            tracing::info!(load_balancer_id = %load_balancer_id, "Fleet converged; nothing to cancel");
            return Ok(OperationResult {
                load_balancer: Some(scan.load_balancer),
                actions: Vec::new(),
                pending: scan.pending,
            });
        }

        let request = ActionRequest {
            cancel_configurations: true,
            ..ActionRequest::default()
        };
        self.execute(load_balancer_id, request, scan.pending).await
    }

    /// Read the load balancer and every child kind concurrently.
    pub async fn scan(&self, load_balancer_id: &str) -> ReconcileResult<FleetScan> {
        let plane = &self.plane;
        let (load_balancer, health_monitors, listeners, policies, routes, rules, target_groups) = tokio::try_join!(
            self.show_load_balancer(load_balancer_id),
            fetch_children(plane.health_monitors.list(load_balancer_id)),
            fetch_children(plane.listeners.list(load_balancer_id)),
            fetch_children(plane.policies.list(load_balancer_id)),
            fetch_children(plane.routes.list(load_balancer_id)),
            fetch_children(plane.rules.list(load_balancer_id)),
            fetch_children(plane.target_groups.list(load_balancer_id)),
        )?;

        let mut pending = Vec::new();
        collect_pending(&mut pending, std::slice::from_ref(&load_balancer));
        collect_pending(&mut pending, &health_monitors);
        collect_pending(&mut pending, &listeners);
        collect_pending(&mut pending, &policies);
        collect_pending(&mut pending, &routes);
        collect_pending(&mut pending, &rules);
        collect_pending(&mut pending, &target_groups);

        tracing::debug!(
            load_balancer_id = %load_balancer_id,
            children = health_monitors.len()
                + listeners.len()
                + policies.len()
                + routes.len()
                + rules.len()
                + target_groups.len(),
            pending = pending.len(),
            "Fleet scanned"
        );

        Ok(FleetScan {
            load_balancer,
            pending: PendingReport(pending),
        })
    }

    async fn show_load_balancer(&self, id: &str) -> ReconcileResult<Snapshot<LoadBalancer>> {
        let snapshot = self
            .plane
            .load_balancers
            .show(id)
            .await
            .map_err(|e| ReconcileError::not_found_or(Kind::LoadBalancer, id, e))?;
        if snapshot.configuration_status == ConfigurationStatus::DeleteStaged {
            return Err(ReconcileError::ResourceGone {
                kind: Kind::LoadBalancer,
                id: id.to_string(),
            });
        }
        Ok(snapshot)
    }

    async fn execute(
        &self,
        load_balancer_id: &str,
        request: ActionRequest,
        pending: PendingReport,
    ) -> ReconcileResult<OperationResult> {
        let actions = request.names();
        tracing::info!(load_balancer_id = %load_balancer_id, actions = ?actions, "Invoking fleet action");

        let handle = match self.plane.actions.action(load_balancer_id, &request).await {
            Ok(handle) => handle,
            Err(e) => {
                return Err(ReconcileError::ApplyFailed {
                    load_balancer_id: load_balancer_id.to_string(),
                    pending,
                    source: Box::new(ReconcileError::not_found_or(Kind::LoadBalancer, load_balancer_id, e)),
                })
            }
        };
        for action in actions.iter().copied() {
            metrics::record_fleet_action(action);
        }

        let poller = self.settings.poller(
            self.settings.action_timeout,
            format!("{} {}", Kind::LoadBalancer, handle.load_balancer_id),
        );
        let polled = poller
            .run(
                &[OperationStatus::Processing],
                &[OperationStatus::Complete],
                || self.operation_status(&handle.load_balancer_id),
            )
            .await;

        match polled {
            Ok(load_balancer) => {
                tracing::info!(
                    load_balancer_id = %load_balancer_id,
                    revision = load_balancer.observed.revision,
                    "Fleet action complete"
                );
                Ok(OperationResult {
                    load_balancer: Some(load_balancer),
                    actions,
                    pending,
                })
            }
            Err(e) => {
                let source = ReconcileError::from_poll(Kind::LoadBalancer, load_balancer_id, e);
                tracing::error!(
                    load_balancer_id = %load_balancer_id,
                    pending = %pending,
                    error = %source,
                    "Fleet action failed"
                );
                Err(ReconcileError::ApplyFailed {
                    load_balancer_id: load_balancer_id.to_string(),
                    pending,
                    source: Box::new(source),
                })
            }
        }
    }

    async fn operation_status(
        &self,
        id: &str,
    ) -> ReconcileResult<(Snapshot<LoadBalancer>, OperationStatus)> {
        let snapshot = self.show_load_balancer(id).await?;
        let status = snapshot.observed.operation_status;
        Ok((snapshot, status))
    }
}

async fn fetch_children<K, F>(call: F) -> ReconcileResult<Vec<Snapshot<K>>>
where
    K: ResourceKind,
    F: std::future::Future<Output = crate::api::error::ApiResult<Vec<Snapshot<K>>>>,
{
    Ok(call.await?)
}

fn collect_pending<K: ResourceKind>(pending: &mut Vec<PendingChange>, snapshots: &[Snapshot<K>]) {
    pending.extend(
        snapshots
            .iter()
            .filter(|s| !s.configuration_status.is_active())
            .map(|s| PendingChange {
                kind: K::KIND,
                id: s.id.clone(),
                status: s.configuration_status,
            }),
    );
}
