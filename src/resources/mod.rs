//! Resource data model.
//!
//! # Data Flow
//! ```text
//! Remote JSON body
//!     → snapshot.rs (Snapshot<K>: attributes + properties + observed + active + staged)
//!     → staging::status (resolved view per ConfigurationStatus)
//!
//! Caller
//!     → snapshot.rs (Desired<K>: attributes + properties + config)
//!     → staging::delta (field-level differences)
//! ```
//!
//! # Design Decisions
//! - One marker type per kind; `ResourceKind` bundles its field sets
//! - Attributes (name/description/tags) are shared and never staged
//! - References between resources (listener, target groups, ...) are plain IDs

pub mod attributes;
pub mod health_monitor;
pub mod kind;
pub mod listener;
pub mod load_balancer;
pub mod operation;
pub mod policy;
pub mod route;
pub mod rule;
pub mod scope;
pub mod snapshot;
pub mod system_update;
pub mod target_group;

pub use attributes::Attributes;
pub use health_monitor::{HealthMonitor, HealthMonitorConfig};
pub use kind::{Kind, PatchOf, ResourceKind};
pub use listener::{Listener, ListenerConfig};
pub use load_balancer::{LoadBalancer, LoadBalancerConfig, LoadBalancerProperties};
pub use operation::{ActionRequest, OperationHandle, OperationStatus};
pub use policy::{Policy, PolicyConfig};
pub use route::{Route, RouteConfig, RouteProperties};
pub use rule::{Rule, RuleConfig, RuleProperties};
pub use scope::LoadBalancerScope;
pub use snapshot::{ConfigurationStatus, Desired, Snapshot};
pub use system_update::{SystemUpdate, SystemUpdateRef};
pub use target_group::{Member, TargetGroup, TargetGroupConfig};
