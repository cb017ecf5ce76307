//! Idempotent deletion.
//!
//! # Responsibilities
//! - Treat "not found" and "already DELETE_STAGED" as success
//! - Distinguish a failed delete from one a concurrent actor already started
//! - Wait until Show reports the resource gone
//!
//! # Design Decisions
//! - A DELETE_STAGED resource counts as deleted: readers already treat it as absent
//! - The original delete error is returned when the re-fetch does not explain it

use std::fmt;
use std::sync::Arc;

use crate::api::client::RemoteResourceClient;
use crate::reconcile::error::{ReconcileError, ReconcileResult};
use crate::reconcile::ReconcileSettings;
use crate::resources::kind::ResourceKind;
use crate::resources::operation::OperationStatus;
use crate::resources::snapshot::{ConfigurationStatus, Snapshot};

/// Progress of a deletion as seen through Show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionState {
    Processing,
    Deleted,
    /// The background operation on the resource reported a failure.
    Failed(OperationStatus),
}

impl fmt::Display for DeletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionState::Processing => f.write_str("PROCESSING"),
            DeletionState::Deleted => f.write_str("DELETED"),
            DeletionState::Failed(status) => write!(f, "FAILED({})", status),
        }
    }
}

/// How a delete call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The resource did not exist.
    AlreadyGone,
    /// Deletion was already pending when the delete call failed.
    AlreadyPending,
    /// Show now reports not found.
    Deleted,
    /// The resource is DELETE_STAGED until the next fleet apply.
    Staged,
}

/// Deletes resources of one kind.
pub struct DeletionReconciler<K: ResourceKind> {
    client: Arc<dyn RemoteResourceClient<K>>,
    settings: ReconcileSettings,
}

impl<K: ResourceKind> DeletionReconciler<K> {
    pub fn new(client: Arc<dyn RemoteResourceClient<K>>, settings: ReconcileSettings) -> Self {
        Self { client, settings }
    }

    pub async fn delete(&self, id: &str) -> ReconcileResult<DeleteOutcome> {
        match self.client.delete(id).await {
            Ok(()) => {
                tracing::info!(kind = %K::KIND, id = %id, "Delete accepted");
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(kind = %K::KIND, id = %id, "Already deleted");
                return Ok(DeleteOutcome::AlreadyGone);
            }
            Err(e) => {
                return match self.client.show(id).await {
                    Ok(snapshot) if snapshot.configuration_status == ConfigurationStatus::DeleteStaged => {
                        tracing::info!(
                            kind = %K::KIND,
                            id = %id,
                            error = %e,
                            "Delete failed but deletion is already pending"
                        );
                        Ok(DeleteOutcome::AlreadyPending)
                    }
                    Err(refetch) if refetch.is_not_found() => {
                        tracing::info!(kind = %K::KIND, id = %id, "Deleted concurrently");
                        Ok(DeleteOutcome::AlreadyGone)
                    }
                    _ => Err(ReconcileError::Api(e)),
                };
            }
        }

        let poller = self
            .settings
            .poller(self.settings.delete_timeout, format!("{} {}", K::KIND, id));
        let last = poller
            .run(
                &[DeletionState::Processing],
                &[DeletionState::Deleted],
                || self.observe(id),
            )
            .await
            .map_err(|e| ReconcileError::from_poll(K::KIND, id, e))?;

        Ok(match last {
            Some(_) => DeleteOutcome::Staged,
            None => DeleteOutcome::Deleted,
        })
    }

    async fn observe(&self, id: &str) -> ReconcileResult<(Option<Snapshot<K>>, DeletionState)> {
        match self.client.show(id).await {
            Ok(snapshot) => {
                let state = deletion_state(&snapshot);
                Ok((Some(snapshot), state))
            }
            Err(e) if e.is_not_found() => Ok((None, DeletionState::Deleted)),
            Err(e) => Err(ReconcileError::Api(e)),
        }
    }
}

fn deletion_state<K: ResourceKind>(snapshot: &Snapshot<K>) -> DeletionState {
    if snapshot.configuration_status == ConfigurationStatus::DeleteStaged {
        return DeletionState::Deleted;
    }
    match K::operation_status(snapshot) {
        Some(status @ (OperationStatus::Error | OperationStatus::Stuck)) => DeletionState::Failed(status),
        _ => DeletionState::Processing,
    }
}
