//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events: kind, id, status, load_balancer_id)
//!     → metrics.rs (API call counters, poll outcomes, fleet actions)
//!
//! Consumers:
//!     → stderr (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
