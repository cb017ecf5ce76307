//! Remote API subsystem.
//!
//! # Data Flow
//! ```text
//! reconcile / staging
//!     → control_plane.rs (one client per kind, built once)
//!     → client.rs (typed Show/List/Create/Update/Delete/CreateStaged/UpdateStaged/Action)
//!     → transport.rs (reqwest, auth token, request ID)
//!     → error.rs (404 → NotFound, non-2xx → Status, network → Transport)
//! ```
//!
//! # Design Decisions
//! - Wire envelopes (`{"health_monitor": {...}}`) never leave this module
//! - No implicit retries; errors propagate to the caller unchanged
//! - Trait seams allow in-memory control planes in tests

pub mod client;
pub mod control_plane;
pub mod error;
pub mod transport;

pub use client::{HttpActions, HttpResourceClient, LoadBalancerActions, RemoteResourceClient};
pub use control_plane::ControlPlane;
pub use error::{ApiError, ApiResult};
pub use transport::HttpTransport;
