//! Staged configuration traits and the field-set generator.
//!
//! Every resource kind has one struct of operational fields (the values that go
//! through staging) and a matching patch struct with one [`Field`] per field.
//! [`staged_config!`] generates both from a single field list, along with the
//! overlay/diff/patch plumbing, so the per-field rules live in one place.
//!
//! [`Field`]: crate::staging::Field

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Operational (staged) fields of one resource kind.
pub trait StagedConfig:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Patch: StagedPatch;

    /// Resolves a sparse UPDATE_STAGED overlay on top of `self` (the active values).
    fn overlay(&self, staged: &Self) -> Self;

    /// Field-by-field difference from `self` (current) to `desired`.
    fn diff(&self, desired: &Self) -> Self::Patch;

    /// Writes every set field of `patch` into `self`.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// A sparse set of changed operational fields.
pub trait StagedPatch: Debug + Clone + Default + PartialEq + Serialize + Send + Sync + 'static {
    fn is_empty(&self) -> bool;

    /// Names of the fields carried by this patch, in declaration order.
    fn changed_fields(&self) -> Vec<&'static str>;
}

/// Declares a staged config struct and its patch struct.
///
/// ```ignore
/// staged_config! {
///     /// Operational settings of a listener.
///     pub struct ListenerConfig => ListenerPatch {
///         pub ip_address: String,
///         pub port: u16,
///     }
/// }
/// ```
macro_rules! staged_config {
    (
        $(#[$config_meta:meta])*
        pub struct $config:ident => $patch:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident : $ty:ty,
            )+
        }
    ) => {
        $(#[$config_meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default)]
        pub struct $config {
            $(
                $(#[$field_meta])*
                #[serde(deserialize_with = "crate::staging::null_as_default")]
                pub $field: $ty,
            )+
        }

        #[doc = concat!("Changed fields of a [`", stringify!($config), "`].")]
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize)]
        pub struct $patch {
            $(
                #[serde(skip_serializing_if = "crate::staging::Field::is_unset")]
                pub $field: crate::staging::Field<$ty>,
            )+
        }

        impl crate::staging::StagedConfig for $config {
            type Patch = $patch;

            fn overlay(&self, staged: &Self) -> Self {
                Self {
                    $( $field: crate::staging::overlay_field(&self.$field, &staged.$field), )+
                }
            }

            fn diff(&self, desired: &Self) -> $patch {
                $patch {
                    $( $field: crate::staging::Field::changed(&self.$field, &desired.$field), )+
                }
            }

            fn apply_patch(&mut self, patch: &$patch) {
                $(
                    if let crate::staging::Field::Set(value) = &patch.$field {
                        self.$field = value.clone();
                    }
                )+
            }
        }

        impl crate::staging::StagedPatch for $patch {
            fn is_empty(&self) -> bool {
                true $( && self.$field.is_unset() )+
            }

            fn changed_fields(&self) -> Vec<&'static str> {
                let mut fields = Vec::new();
                $(
                    if self.$field.is_set() {
                        fields.push(stringify!($field));
                    }
                )+
                fields
            }
        }
    };
}

pub(crate) use staged_config;
