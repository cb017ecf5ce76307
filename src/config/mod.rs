//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MlbConfig (validated, immutable)
//!     → api::HttpTransport + reconcile::ReconcileSettings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; built into one client context per credential set
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ApiConfig, MlbConfig, ObservabilityConfig, PollingConfig, TimeoutConfig};
