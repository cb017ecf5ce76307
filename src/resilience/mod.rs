//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Asynchronous remote operation (apply, system update, create, delete):
//!     → poller.rs (initial delay, fixed interval, deadline, shutdown)
//!     → refresh closure supplied by the caller (Show, mapped to a status)
//!     → target status → value; anything else → PollError
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every wait has a deadline
//! - No automatic retries of remote calls at this layer
//! - Timed-out or cancelled operations are left running remotely

pub mod poller;

pub use poller::{PollError, Poller};
