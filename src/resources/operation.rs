//! Fleet-wide actions and the asynchronous operations they start.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::resources::system_update::SystemUpdateRef;

/// Status of the asynchronous operation running on a load balancer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// No operation has run yet.
    #[default]
    None,
    Processing,
    Complete,
    Stuck,
    Error,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationStatus::None => "NONE",
            OperationStatus::Processing => "PROCESSING",
            OperationStatus::Complete => "COMPLETE",
            OperationStatus::Stuck => "STUCK",
            OperationStatus::Error => "ERROR",
            OperationStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Body of a load balancer action call.
///
/// Flags serialize as `"apply-configurations": null`, the form the action API expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    #[serde(
        rename = "apply-configurations",
        skip_serializing_if = "is_false",
        serialize_with = "flag"
    )]
    pub apply_configurations: bool,

    #[serde(rename = "system-update", skip_serializing_if = "Option::is_none")]
    pub system_update: Option<SystemUpdateRef>,

    #[serde(
        rename = "cancel-configurations",
        skip_serializing_if = "is_false",
        serialize_with = "flag"
    )]
    pub cancel_configurations: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn flag<S: Serializer>(_: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_unit()
}

impl ActionRequest {
    pub fn is_empty(&self) -> bool {
        !self.apply_configurations && self.system_update.is_none() && !self.cancel_configurations
    }

    /// Names of the requested actions, for logs and metrics.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.apply_configurations {
            names.push("apply_configurations");
        }
        if self.system_update.is_some() {
            names.push("system_update");
        }
        if self.cancel_configurations {
            names.push("cancel_configurations");
        }
        names
    }
}

/// Handle on an action accepted by the remote side.
///
/// Progress is reported through the load balancer's `operation_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub load_balancer_id: String,
    pub request: ActionRequest,
}
