//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Per resource (manager.rs):
//!     locks.rs (one writer per ID)
//!     → Show → staging::status → staging::delta → staging::driver
//!     → delete.rs (idempotent delete, wait until gone)
//!
//! Per load balancer (apply.rs):
//!     concurrent fleet scan → revision gate → one Action call
//!     → resilience::Poller on operation_status → final snapshot
//! ```
//!
//! # Design Decisions
//! - All clients come from one `ControlPlane` passed in explicitly
//! - Every error reaches the caller; only delete swallows not-found
//! - Each operation kind has its own timeout budget

pub mod apply;
pub mod delete;
pub mod error;
pub mod locks;
pub mod manager;

use std::time::Duration;

use crate::config::MlbConfig;
use crate::lifecycle::Shutdown;
use crate::resilience::Poller;

pub use apply::{ApplyOrchestrator, FleetScan, OperationResult};
pub use delete::{DeleteOutcome, DeletionReconciler, DeletionState};
pub use error::{PendingChange, PendingReport, ReconcileError, ReconcileResult};
pub use locks::{ResourceGuard, ResourceLocks};
pub use manager::ResourceManager;

/// Time budgets, polling cadence and cancellation for reconciliation calls.
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    pub create_timeout: Duration,
    pub update_timeout: Duration,
    pub delete_timeout: Duration,
    pub action_timeout: Duration,
    pub poll_delay: Duration,
    pub poll_interval: Duration,
    pub shutdown: Option<Shutdown>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self::from_config(&MlbConfig::default())
    }
}

impl ReconcileSettings {
    pub fn from_config(config: &MlbConfig) -> Self {
        Self {
            create_timeout: config.timeouts.create(),
            update_timeout: config.timeouts.update(),
            delete_timeout: config.timeouts.delete(),
            action_timeout: config.timeouts.action(),
            poll_delay: config.polling.delay(),
            poll_interval: config.polling.interval(),
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// A poller with this cadence, bounded by `timeout` and wired to shutdown.
    pub(crate) fn poller(&self, timeout: Duration, label: String) -> Poller {
        let poller = Poller::new(timeout)
            .delay(self.poll_delay)
            .interval(self.poll_interval)
            .label(label);
        match &self.shutdown {
            Some(shutdown) => poller.cancel_on(shutdown.subscribe()),
            None => poller,
        }
    }
}
