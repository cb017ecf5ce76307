//! Staging subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot<K> (fresh Show)
//!     → status.rs (ResolvedView: which values are in effect for readers)
//!     → delta.rs (AttributeDelta + config patch against the resolved view)
//!     → driver.rs (Update for attributes, CreateStaged/UpdateStaged for config)
//!     → RemoteResourceClient
//! ```
//!
//! # Design Decisions
//! - Status handling is an exhaustive match on `ConfigurationStatus`
//! - Deltas are field-level; unchanged fields are never sent
//! - `Field<T>` keeps "absent" and "set to empty" apart on the wire

pub mod config;
pub mod delta;
pub mod driver;
pub mod field;
pub mod status;

pub use config::{StagedConfig, StagedPatch};
pub use delta::{AttributeDelta, Delta};
pub use driver::{StagingCall, StagingDriver, StagingOutcome};
pub use field::{null_as_default, overlay_field, Field, ZeroValue};
pub use status::{resolve, ResolvedView};
