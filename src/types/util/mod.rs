//! Small serde helpers shared by the model types.
//!
//! Component and interaction payloads are tagged by an integer `type` field
//! whose meaning decides the shape of the rest of the object. Those custom
//! deserializers first buffer the object into a [`serde_json::Value`] and
//! then decode it with [`ValueExt::deserialize_into`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn is_false(value: &bool) -> bool {
    !value
}

/// Extension trait on [`serde_json::Value`] for decoding a buffered value
/// into a concrete type.
pub(crate) trait ValueExt: Sized {
    /// Consume this value and attempt to deserialize it into `T`.
    fn deserialize_into<T: serde::de::DeserializeOwned>(self) -> Result<T, serde_json::Error>;
}

impl ValueExt for serde_json::Value {
    fn deserialize_into<T: serde::de::DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self)
    }
}

/// A field that can be left untouched, explicitly cleared, or set.
///
/// PATCH endpoints distinguish an absent key (keep the current value) from
/// `null` (reset it). Pair with
/// `#[serde(default, skip_serializing_if = "Nullable::is_unchanged")]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Nullable<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Nullable<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Clear,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Clear | Self::Unchanged => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

/// Integer (de)serialization for `bitflags` types that keeps unknown bits.
macro_rules! impl_bitflags_serde {
    ($name:ident, $repr:ty) => {
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                <$repr as serde::Serialize>::serialize(&self.bits(), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let bits = <$repr as serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from_bits_retain(bits))
            }
        }
    };
}

pub(crate) use impl_bitflags_serde;

/// Integer-tagged enum that decodes values it doesn't know into
/// `Unknown(u8)` instead of failing the surrounding payload.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
        #[serde(from = "u8", into = "u8")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
            Unknown(u8),
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($value => Self::$variant,)*
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)*
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}

pub(crate) use open_enum;

/// Random 32-character lowercase hex string (128 bits).
pub(crate) fn random_hex_id() -> String {
    use rand::Rng;
    let value: u128 = rand::thread_rng().gen();
    format!("{value:032x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize, Deserialize, Default)]
    struct Patch {
        #[serde(default, skip_serializing_if = "Nullable::is_unchanged")]
        description: Nullable<String>,
    }

    #[test]
    fn nullable_three_states() {
        let unchanged = Patch::default();
        assert_eq!(serde_json::to_value(&unchanged).unwrap(), json!({}));

        let cleared = Patch {
            description: Nullable::Clear,
        };
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            json!({"description": null})
        );

        let set = Patch {
            description: Nullable::Set("hi".into()),
        };
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({"description": "hi"})
        );
    }

    #[test]
    fn random_hex_id_shape() {
        let id = random_hex_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, random_hex_id());
    }

    #[test]
    fn value_ext_decodes() {
        let v = json!(42u64);
        let n: u64 = v.deserialize_into().unwrap();
        assert_eq!(n, 42);
    }
}
