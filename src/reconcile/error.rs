//! Reconciliation error definitions.

use serde::Serialize;
use std::fmt::{self, Debug, Display};
use std::time::Duration;
use thiserror::Error;

use crate::api::error::ApiError;
use crate::resilience::PollError;
use crate::resources::kind::Kind;
use crate::resources::snapshot::ConfigurationStatus;

/// Errors surfaced by reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{kind} {id} not found")]
    NotFound { kind: Kind, id: String },

    /// The resource is DELETE_STAGED and must be re-created.
    #[error("{kind} {id} is pending deletion")]
    ResourceGone { kind: Kind, id: String },

    /// A create-only property differs from the remote resource.
    #[error("{kind} {id}: create-only properties cannot be changed")]
    ImmutableChange { kind: Kind, id: String },

    /// A system update was requested out of order.
    #[error(
        "load balancer {load_balancer_id} is at revision {revision}; system update {system_update_id} applies to revision {current_revision}"
    )]
    RevisionMismatch {
        load_balancer_id: String,
        system_update_id: String,
        revision: u64,
        current_revision: u64,
        next_revision: u64,
    },

    /// A poll observed a status outside its pending and target sets.
    #[error("{kind} {id} reported unexpected status {status}")]
    UnexpectedStatus { kind: Kind, id: String, status: String },

    /// A poll ran out of time; the remote operation may still finish later.
    #[error("timed out after {elapsed:?} waiting for {kind} {id}")]
    Timeout {
        kind: Kind,
        id: String,
        elapsed: Duration,
        /// Last snapshot seen before the deadline.
        last_seen: Option<serde_json::Value>,
    },

    #[error("cancelled while waiting for {kind} {id}")]
    Cancelled { kind: Kind, id: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A fleet action did not complete; `pending` lists the resources not yet ACTIVE.
    #[error("fleet action on load balancer {load_balancer_id} failed: {source} (pending: {pending})")]
    ApplyFailed {
        load_balancer_id: String,
        pending: PendingReport,
        #[source]
        source: Box<ReconcileError>,
    },
}

impl ReconcileError {
    /// Attach resource identity to a poll failure.
    pub fn from_poll<T, S>(kind: Kind, id: &str, err: PollError<T, S, ReconcileError>) -> Self
    where
        T: Debug + Serialize,
        S: Debug + Display,
    {
        let id = id.to_string();
        match err {
            PollError::Timeout { elapsed, last } => ReconcileError::Timeout {
                kind,
                id,
                elapsed,
                last_seen: last.and_then(|value| serde_json::to_value(value).ok()),
            },
            PollError::UnexpectedStatus { status, .. } => ReconcileError::UnexpectedStatus {
                kind,
                id,
                status: status.to_string(),
            },
            PollError::Refresh(e) => e,
            PollError::Cancelled { .. } => ReconcileError::Cancelled { kind, id },
        }
    }

    /// Map a 404 from a call on `kind`/`id` to `NotFound`.
    pub fn not_found_or(kind: Kind, id: &str, err: ApiError) -> Self {
        if err.is_not_found() {
            ReconcileError::NotFound {
                kind,
                id: id.to_string(),
            }
        } else {
            ReconcileError::Api(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ReconcileError::NotFound { .. } => true,
            ReconcileError::Api(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// One resource that is not ACTIVE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingChange {
    pub kind: Kind,
    pub id: String,
    pub status: ConfigurationStatus,
}

/// Every non-ACTIVE resource found by a fleet scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PendingReport(pub Vec<PendingChange>);

impl PendingReport {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingChange> {
        self.0.iter()
    }
}

impl Display for PendingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        for (i, change) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {} ({})", change.kind, change.id, change.status)?;
        }
        Ok(())
    }
}
