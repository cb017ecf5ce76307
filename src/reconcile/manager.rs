//! Per-kind caller facade: create, read, update, delete, cancel.

use std::sync::Arc;

use crate::api::client::RemoteResourceClient;
use crate::reconcile::delete::{DeleteOutcome, DeletionReconciler};
use crate::reconcile::error::{ReconcileError, ReconcileResult};
use crate::reconcile::locks::ResourceLocks;
use crate::reconcile::ReconcileSettings;
use crate::resources::kind::ResourceKind;
use crate::resources::operation::OperationStatus;
use crate::resources::snapshot::{ConfigurationStatus, Desired, Snapshot};
use crate::staging::delta::Delta;
use crate::staging::driver::{StagingDriver, StagingOutcome};
use crate::staging::status::{resolve, ResolvedView};

/// Reconciles individual resources of kind `K`.
///
/// Writes to one ID are serialized through the shared [`ResourceLocks`].
pub struct ResourceManager<K: ResourceKind> {
    client: Arc<dyn RemoteResourceClient<K>>,
    driver: StagingDriver<K>,
    deleter: DeletionReconciler<K>,
    locks: ResourceLocks,
    settings: ReconcileSettings,
}

impl<K: ResourceKind> ResourceManager<K> {
    pub fn new(
        client: Arc<dyn RemoteResourceClient<K>>,
        locks: ResourceLocks,
        settings: ReconcileSettings,
    ) -> Self {
        Self {
            driver: StagingDriver::new(client.clone()),
            deleter: DeletionReconciler::new(client.clone(), settings.clone()),
            client,
            locks,
            settings,
        }
    }

    /// Create a resource.
    ///
    /// Kinds that create in the background (load balancers) are waited on
    /// until their operation completes.
    pub async fn create(&self, desired: &Desired<K>) -> ReconcileResult<Snapshot<K>> {
        let created = self.client.create(desired).await?;
        tracing::info!(
            kind = %K::KIND,
            id = %created.id,
            status = %created.configuration_status,
            "Resource created"
        );

        if K::operation_status(&created).is_none() {
            return Ok(created);
        }

        let id = created.id.clone();
        let poller = self
            .settings
            .poller(self.settings.create_timeout, format!("{} {}", K::KIND, id));
        poller
            .run(
                &[OperationStatus::Processing],
                &[OperationStatus::Complete],
                || self.operation_status(&id),
            )
            .await
            .map_err(|e| ReconcileError::from_poll(K::KIND, &id, e))
    }

    /// The values currently in effect. DELETE_STAGED resources read as not found.
    pub async fn read(&self, id: &str) -> ReconcileResult<ResolvedView<K>> {
        let snapshot = self.show(id).await?;
        resolve(&snapshot).ok_or_else(|| ReconcileError::NotFound {
            kind: K::KIND,
            id: id.to_string(),
        })
    }

    /// Bring resource `id` to `desired`, staging operational changes.
    pub async fn update(&self, id: &str, desired: &Desired<K>) -> ReconcileResult<StagingOutcome<K>> {
        let _guard = self.locks.lock(K::KIND, id).await;
        let budget = self.settings.update_timeout;

        match tokio::time::timeout(budget, self.update_locked(id, desired)).await {
            Ok(result) => result,
            Err(_) => Err(ReconcileError::Timeout {
                kind: K::KIND,
                id: id.to_string(),
                elapsed: budget,
                last_seen: None,
            }),
        }
    }

    async fn update_locked(&self, id: &str, desired: &Desired<K>) -> ReconcileResult<StagingOutcome<K>> {
        let snapshot = self.show(id).await?;
        let view = resolve(&snapshot).ok_or_else(|| ReconcileError::ResourceGone {
            kind: K::KIND,
            id: id.to_string(),
        })?;

        let delta = Delta::build(desired, &view);
        if delta.is_empty() && !delta.properties_changed {
            tracing::debug!(kind = %K::KIND, id = %id, "Already up to date");
        }
        self.driver
            .apply(id, &delta, snapshot.configuration_status)
            .await
    }

    /// Delete resource `id`; succeeds when it is already gone.
    pub async fn delete(&self, id: &str) -> ReconcileResult<DeleteOutcome> {
        let _guard = self.locks.lock(K::KIND, id).await;
        self.deleter.delete(id).await
    }

    /// Discard the pending staged change on `id`.
    ///
    /// Returns `false` without a remote call when nothing is staged.
    pub async fn cancel_staged(&self, id: &str) -> ReconcileResult<bool> {
        let _guard = self.locks.lock(K::KIND, id).await;
        let snapshot = self.show(id).await?;

        match snapshot.configuration_status {
            ConfigurationStatus::Active => Ok(false),
            ConfigurationStatus::CreateStaged | ConfigurationStatus::UpdateStaged => {
                self.client
                    .cancel_staged(id)
                    .await
                    .map_err(|e| ReconcileError::not_found_or(K::KIND, id, e))?;
                tracing::info!(kind = %K::KIND, id = %id, "Staged change cancelled");
                Ok(true)
            }
            ConfigurationStatus::DeleteStaged => Err(ReconcileError::ResourceGone {
                kind: K::KIND,
                id: id.to_string(),
            }),
        }
    }

    /// Raw snapshot, including staged values.
    pub async fn show(&self, id: &str) -> ReconcileResult<Snapshot<K>> {
        self.client
            .show(id)
            .await
            .map_err(|e| ReconcileError::not_found_or(K::KIND, id, e))
    }

    async fn operation_status(&self, id: &str) -> ReconcileResult<(Snapshot<K>, OperationStatus)> {
        let snapshot = self.show(id).await?;
        let status = K::operation_status(&snapshot).unwrap_or_default();
        Ok((snapshot, status))
    }
}
