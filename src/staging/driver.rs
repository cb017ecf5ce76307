//! Routing of deltas to the remote API.
//!
//! # Responsibilities
//! - Send attribute changes with a direct Update
//! - Send config changes with CreateStaged (ACTIVE) or UpdateStaged (already staged)
//! - Refuse any write to a DELETE_STAGED resource
//!
//! # Design Decisions
//! - Exactly one remote call per non-empty delta category, none for empty ones
//! - No retries; the first error is returned to the caller
//! - The status passed in is the one the delta was computed against

use std::sync::Arc;

use serde::Serialize;

use crate::api::client::RemoteResourceClient;
use crate::reconcile::error::{ReconcileError, ReconcileResult};
use crate::resources::kind::ResourceKind;
use crate::resources::snapshot::{ConfigurationStatus, Snapshot};
use crate::staging::delta::Delta;
use crate::staging::StagedPatch;

/// A remote call issued by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingCall {
    Update,
    CreateStaged,
    UpdateStaged,
}

/// Calls issued for one delta and the last snapshot returned.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingOutcome<K: ResourceKind> {
    pub calls: Vec<StagingCall>,
    pub snapshot: Option<Snapshot<K>>,
}

impl<K: ResourceKind> StagingOutcome<K> {
    /// Status reported by the remote side after the last call, if any call was made.
    pub fn status(&self) -> Option<ConfigurationStatus> {
        self.snapshot.as_ref().map(|s| s.configuration_status)
    }
}

/// Sends deltas for one resource kind.
pub struct StagingDriver<K: ResourceKind> {
    client: Arc<dyn RemoteResourceClient<K>>,
}

impl<K: ResourceKind> Clone for StagingDriver<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<K: ResourceKind> StagingDriver<K> {
    pub fn new(client: Arc<dyn RemoteResourceClient<K>>) -> Self {
        Self { client }
    }

    /// Push `delta` to resource `id`, currently in `status`.
    pub async fn apply(
        &self,
        id: &str,
        delta: &Delta<K>,
        status: ConfigurationStatus,
    ) -> ReconcileResult<StagingOutcome<K>> {
        if status == ConfigurationStatus::DeleteStaged {
            return Err(ReconcileError::ResourceGone {
                kind: K::KIND,
                id: id.to_string(),
            });
        }
        if delta.properties_changed {
            return Err(ReconcileError::ImmutableChange {
                kind: K::KIND,
                id: id.to_string(),
            });
        }

        let mut outcome = StagingOutcome {
            calls: Vec::new(),
            snapshot: None,
        };

        if !delta.attributes.is_empty() {
            tracing::info!(
                kind = %K::KIND,
                id = %id,
                fields = ?delta.attributes.changed_fields(),
                "Updating attributes"
            );
            let snapshot = self
                .client
                .update(id, &delta.attributes)
                .await
                .map_err(|e| ReconcileError::not_found_or(K::KIND, id, e))?;
            outcome.calls.push(StagingCall::Update);
            outcome.snapshot = Some(snapshot);
        }

        if delta.config.is_empty() {
            return Ok(outcome);
        }

        let fields = delta.config.changed_fields();
        let (call, result) = match status {
            ConfigurationStatus::Active => {
                tracing::info!(kind = %K::KIND, id = %id, fields = ?fields, "Creating staged change");
                (
                    StagingCall::CreateStaged,
                    self.client.create_staged(id, &delta.config).await,
                )
            }
            ConfigurationStatus::CreateStaged | ConfigurationStatus::UpdateStaged => {
                tracing::info!(
                    kind = %K::KIND,
                    id = %id,
                    status = %status,
                    fields = ?fields,
                    "Merging into staged change"
                );
                (
                    StagingCall::UpdateStaged,
                    self.client.update_staged(id, &delta.config).await,
                )
            }
            ConfigurationStatus::DeleteStaged => {
                return Err(ReconcileError::ResourceGone {
                    kind: K::KIND,
                    id: id.to_string(),
                })
            }
        };

        let snapshot = result.map_err(|e| ReconcileError::not_found_or(K::KIND, id, e))?;
        tracing::debug!(
            kind = %K::KIND,
            id = %id,
            status = %snapshot.configuration_status,
            "Staged change accepted"
        );
        outcome.calls.push(call);
        outcome.snapshot = Some(snapshot);
        Ok(outcome)
    }
}
