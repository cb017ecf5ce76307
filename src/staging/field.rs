//! Explicitly set/unset field values.
//!
//! # Responsibilities
//! - Distinguish "field absent" from "field present but empty/zero" in staged requests
//! - Detect a type's zero value for sparse-overlay resolution
//! - Decode explicit JSON `null` as the zero value
//!
//! # Design Decisions
//! - `Field::Unset` is skipped on the wire; `Field::Set` always serializes its value
//! - Zero values follow the remote API: empty strings, 0, false, empty collections

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single field of a staged-change request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// Not part of the request.
    #[default]
    Unset,
    /// Sent as-is, even when empty or zero.
    Set(T),
}

impl<T> Field<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Field::Set(value) => Some(value),
            Field::Unset => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Set(value) => Some(value),
            Field::Unset => None,
        }
    }
}

impl<T: PartialEq + Clone> Field<T> {
    /// `Set(desired)` when it differs from `current`, `Unset` otherwise.
    pub fn changed(current: &T, desired: &T) -> Self {
        if current == desired {
            Field::Unset
        } else {
            Field::Set(desired.clone())
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Set(value),
            None => Field::Unset,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Set(value) => value.serialize(serializer),
            Field::Unset => serializer.serialize_none(),
        }
    }
}

/// Types with a distinguished "zero" value.
pub trait ZeroValue {
    fn is_zero(&self) -> bool;
}

macro_rules! zero_is_default {
    ($($ty:ty),+) => {
        $(
            impl ZeroValue for $ty {
                fn is_zero(&self) -> bool {
                    *self == <$ty>::default()
                }
            }
        )+
    };
}

zero_is_default!(u8, u16, u32, u64, i32, i64, bool);

impl ZeroValue for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> ZeroValue for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

/// Deserialize a field, reading `null` as `T::default()`.
///
/// `#[serde(default)]` only covers missing keys; the remote API also sends
/// `null` for fields absent from a sparse overlay.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Resolves one field of an UPDATE_STAGED overlay.
///
/// The staged value wins unless it is the type's zero value, in which case the
/// active value is reported. A staged change *to* the zero value (port 0, an
/// empty path, an emptied member list) is therefore indistinguishable from an
/// unstaged field and resolves to the active value. The remote API reports
/// sparse overlays this way, so the rule is kept as-is.
pub fn overlay_field<T: ZeroValue + Clone>(active: &T, staged: &T) -> T {
    if staged.is_zero() {
        active.clone()
    } else {
        staged.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_only_when_different() {
        assert_eq!(Field::changed(&80u16, &80u16), Field::Unset);
        assert_eq!(Field::changed(&80u16, &443u16), Field::Set(443));
        assert_eq!(
            Field::changed(&"http".to_string(), &String::new()),
            Field::Set(String::new())
        );
    }

    #[test]
    fn test_set_empty_value_serializes() {
        let set: Field<String> = Field::Set(String::new());
        assert_eq!(serde_json::to_string(&set).unwrap(), "\"\"");

        let zero: Field<u16> = Field::Set(0);
        assert_eq!(serde_json::to_string(&zero).unwrap(), "0");
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "null_as_default")]
        path: String,
        #[serde(deserialize_with = "null_as_default")]
        port: u16,
    }

    #[test]
    fn test_null_reads_as_zero_value() {
        let decoded: Sample = serde_json::from_str(r#"{"path": null, "port": 8080}"#).unwrap();
        assert_eq!(decoded, Sample { path: String::new(), port: 8080 });

        let decoded: Sample = serde_json::from_str(r#"{"path": "/healthz"}"#).unwrap();
        assert_eq!(decoded, Sample { path: "/healthz".into(), port: 0 });
    }

    #[test]
    fn test_overlay_falls_back_on_zero() {
        assert_eq!(overlay_field(&80u16, &443u16), 443);
        assert_eq!(overlay_field(&80u16, &0u16), 80);
        assert_eq!(overlay_field(&"TCP".to_string(), &String::new()), "TCP");
        assert_eq!(overlay_field(&vec![1, 2], &Vec::new()), vec![1, 2]);
        assert_eq!(overlay_field(&vec![1, 2], &vec![3]), vec![3]);
    }
}
