//! Staged-configuration reconciliation for a managed load balancer control plane.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod reconcile;
pub mod resilience;
pub mod resources;
pub mod staging;

pub use api::ControlPlane;
pub use config::schema::MlbConfig;
pub use lifecycle::Shutdown;
pub use reconcile::{ApplyOrchestrator, ReconcileError, ReconcileSettings, ResourceManager};
