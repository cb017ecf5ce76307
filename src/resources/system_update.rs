//! Revision-gated system updates.

use serde::{Deserialize, Serialize};

/// A system update published for load balancers.
///
/// Updates form a linear chain: an update moves a load balancer from
/// `current_revision` to `next_revision`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemUpdate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub current_revision: u64,
    pub next_revision: u64,
    pub applicable: bool,
}

/// Position of a load balancer relative to a system update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionGate {
    /// The load balancer already runs `next_revision`.
    AlreadyApplied,
    /// The update applies to the load balancer's current revision.
    Applicable,
    /// Applying now would skip or repeat an update in the chain.
    OutOfOrder,
}

impl SystemUpdate {
    pub fn gate(&self, revision: u64) -> RevisionGate {
        if revision == self.next_revision {
            RevisionGate::AlreadyApplied
        } else if revision == self.current_revision {
            RevisionGate::Applicable
        } else {
            RevisionGate::OutOfOrder
        }
    }
}

/// Reference to a system update inside an action request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SystemUpdateRef {
    pub system_update_id: String,
}

impl SystemUpdateRef {
    pub fn new(system_update_id: impl Into<String>) -> Self {
        Self {
            system_update_id: system_update_id.into(),
        }
    }
}
