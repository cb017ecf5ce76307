//! Configuration status resolution.
//!
//! Pure functions over a snapshot: no remote calls, so any snapshot can be
//! re-resolved after a restart.

use serde::Serialize;

use crate::resources::attributes::Attributes;
use crate::resources::kind::ResourceKind;
use crate::resources::snapshot::{ConfigurationStatus, Snapshot};
use crate::staging::StagedConfig;

/// The values a reader should see for one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct ResolvedView<K: ResourceKind> {
    pub id: String,
    pub configuration_status: ConfigurationStatus,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(flatten)]
    pub properties: K::Properties,
    #[serde(flatten)]
    pub observed: K::Observed,
    #[serde(flatten)]
    pub config: K::Config,
}

/// Resolve the configuration in effect for readers.
///
/// Returns `None` for DELETE_STAGED resources: they are logically absent.
/// Attributes always come from the active record.
pub fn resolve<K: ResourceKind>(snapshot: &Snapshot<K>) -> Option<ResolvedView<K>> {
    let config = match snapshot.configuration_status {
        ConfigurationStatus::Active => snapshot.active.clone(),
        ConfigurationStatus::CreateStaged => match &snapshot.staged {
            Some(staged) => staged.clone(),
            None => {
                tracing::warn!(
                    kind = %K::KIND,
                    id = %snapshot.id,
                    "CREATE_STAGED resource without staged values; using active values"
                );
                snapshot.active.clone()
            }
        },
        ConfigurationStatus::UpdateStaged => match &snapshot.staged {
            Some(staged) => snapshot.active.overlay(staged),
            None => snapshot.active.clone(),
        },
        ConfigurationStatus::DeleteStaged => return None,
    };

    Some(ResolvedView {
        id: snapshot.id.clone(),
        configuration_status: snapshot.configuration_status,
        attributes: snapshot.attributes.clone(),
        properties: snapshot.properties.clone(),
        observed: snapshot.observed.clone(),
        config,
    })
}
