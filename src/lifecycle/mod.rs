//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Logging/metrics → Transport → ControlPlane
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Polls stop with Cancelled → Exit
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then clients
//! - Shutdown never sends cancellation to the remote side

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
