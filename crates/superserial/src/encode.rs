//! Encoding capabilities.
//!
//! [`Serializable`] is implemented by anything that can produce a
//! [`Serialized`] tree and be rebuilt from one. Named aggregates also
//! implement [`CustomSerializable`], which gives them a registry name, and
//! most of them get everything else from [`AutoSerializable`]: a list of
//! fields written through a [`FieldWriter`] and a constructor reading
//! [`Fields`]. `#[derive(AutoSerializable)]` generates all of it.
//!
//! Fields the derive is told to skip are never encoded and never required on
//! decode; `Option` fields holding `None` are omitted from the payload.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

use crate::decode::decode;
use crate::error::DecodeError;
use crate::registry::TypeRegistry;
use crate::serialized::{Dict, Serialized};
use crate::value::{Fields, Value};

/// A value that can be encoded into, and rebuilt from, a [`Serialized`] tree.
pub trait Serializable: Sized {
    fn serialize(&self) -> Serialized;

    /// Rebuilds a value, failing on a payload of the wrong shape.
    ///
    /// `registry` resolves any custom types nested inside the payload.
    fn from_serialized(serialized: &Serialized, registry: &TypeRegistry)
    -> Result<Self, DecodeError>;
}

/// A named aggregate that can live in the [`TypeRegistry`].
pub trait CustomSerializable:
    Serializable + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Canonical name written as `ss_typeName`.
    const TYPE_NAME: &'static str;
}

/// An aggregate encoded from its field list.
///
/// Implementors forward [`Serializable`] to [`serialize_auto`] and
/// [`deserialize_auto`].
pub trait AutoSerializable: CustomSerializable {
    fn write_fields(&self, fields: &mut FieldWriter);

    /// Field-mapping constructor. Decides which fields are required.
    fn from_fields(fields: &Fields) -> Result<Self, DecodeError>;
}

/// Collects encoded fields of an aggregate.
#[derive(Debug, Default)]
pub struct FieldWriter {
    entries: Dict,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: Serializable>(&mut self, name: &str, value: &T) -> &mut Self {
        self.entries.insert(name.to_string(), value.serialize());
        self
    }

    /// Writes `value` if present; `None` leaves the key out entirely.
    pub fn optional<T: Serializable>(&mut self, name: &str, value: &Option<T>) -> &mut Self {
        match value {
            Some(value) => self.field(name, value),
            None => {
                trace!(field = name, "omitting absent optional field");
                self
            }
        }
    }

    pub fn into_dict(self) -> Dict {
        self.entries
    }
}

/// Encodes an aggregate as `CustomType(T::TYPE_NAME, Dict(fields))`.
pub fn serialize_auto<T: AutoSerializable>(value: &T) -> Serialized {
    let mut fields = FieldWriter::new();
    value.write_fields(&mut fields);
    Serialized::custom_type(T::TYPE_NAME, fields.into_dict())
}

/// Rebuilds an aggregate from its custom-type envelope or its bare payload.
///
/// The payload is decoded into a generic field mapping first, resolving
/// nested custom types through `registry`, then handed to
/// [`AutoSerializable::from_fields`].
pub fn deserialize_auto<T: AutoSerializable>(
    serialized: &Serialized,
    registry: &TypeRegistry,
) -> Result<T, DecodeError> {
    let data = match serialized {
        Serialized::CustomType { type_name, data } if type_name == T::TYPE_NAME => data.as_ref(),
        Serialized::CustomType { type_name, .. } => {
            return Err(DecodeError::WrongType {
                expected: T::TYPE_NAME.to_string(),
                found: type_name.clone(),
            });
        }
        payload => payload,
    };

    match decode(data, registry)? {
        Value::Dict(fields) => T::from_fields(&fields),
        other => Err(DecodeError::Mismatch {
            expected: "dict",
            found: other.kind(),
        }),
    }
}

fn mismatch(expected: &'static str, found: &Serialized) -> DecodeError {
    DecodeError::Mismatch {
        expected,
        found: found.case().as_str(),
    }
}

// =============================================================================
// Primitive and container impls
// =============================================================================

impl Serializable for Serialized {
    fn serialize(&self) -> Serialized {
        self.clone()
    }

    fn from_serialized(serialized: &Serialized, _: &TypeRegistry) -> Result<Self, DecodeError> {
        Ok(serialized.clone())
    }
}

impl Serializable for String {
    fn serialize(&self) -> Serialized {
        Serialized::Str(self.clone())
    }

    fn from_serialized(serialized: &Serialized, _: &TypeRegistry) -> Result<Self, DecodeError> {
        match serialized {
            Serialized::Str(text) => Ok(text.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl Serializable for i64 {
    fn serialize(&self) -> Serialized {
        Serialized::Integer(*self)
    }

    fn from_serialized(serialized: &Serialized, _: &TypeRegistry) -> Result<Self, DecodeError> {
        match serialized {
            Serialized::Integer(int) => Ok(*int),
            other => Err(mismatch("integer", other)),
        }
    }
}

// Only types that fit in i64 without loss encode as integers.
macro_rules! narrow_int_serializable {
    ($($ty:ty),*) => {$(
        impl Serializable for $ty {
            fn serialize(&self) -> Serialized {
                Serialized::Integer(i64::from(*self))
            }

            fn from_serialized(
                serialized: &Serialized,
                registry: &TypeRegistry,
            ) -> Result<Self, DecodeError> {
                let int = i64::from_serialized(serialized, registry)?;
                <$ty>::try_from(int).map_err(|_| DecodeError::OutOfRange {
                    value: int,
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

narrow_int_serializable!(i32, u32);

impl Serializable for f64 {
    fn serialize(&self) -> Serialized {
        Serialized::FloatingPoint(*self)
    }

    fn from_serialized(serialized: &Serialized, _: &TypeRegistry) -> Result<Self, DecodeError> {
        match serialized {
            Serialized::FloatingPoint(float) => Ok(*float),
            Serialized::Integer(int) => Ok(*int as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl Serializable for f32 {
    fn serialize(&self) -> Serialized {
        Serialized::FloatingPoint(f64::from(*self))
    }

    fn from_serialized(serialized: &Serialized, registry: &TypeRegistry) -> Result<Self, DecodeError> {
        f64::from_serialized(serialized, registry).map(|float| float as f32)
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    fn serialize(&self) -> Serialized {
        Serialized::from_values(self)
    }

    fn from_serialized(serialized: &Serialized, registry: &TypeRegistry) -> Result<Self, DecodeError> {
        match serialized {
            Serialized::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    T::from_serialized(item, registry).map_err(|e| e.at_index(index))
                })
                .collect(),
            other => Err(mismatch("array", other)),
        }
    }
}

impl<T: Serializable> Serializable for BTreeMap<String, T> {
    fn serialize(&self) -> Serialized {
        Serialized::Dict(
            self.iter()
                .map(|(key, value)| (key.clone(), value.serialize()))
                .collect(),
        )
    }

    fn from_serialized(serialized: &Serialized, registry: &TypeRegistry) -> Result<Self, DecodeError> {
        match serialized {
            Serialized::Dict(entries) => entries
                .iter()
                .map(|(key, value)| {
                    T::from_serialized(value, registry)
                        .map(|value| (key.clone(), value))
                        .map_err(|e| e.in_field(key))
                })
                .collect(),
            other => Err(mismatch("dict", other)),
        }
    }
}

impl<T: Serializable> Serializable for HashMap<String, T> {
    fn serialize(&self) -> Serialized {
        Serialized::Dict(
            self.iter()
                .map(|(key, value)| (key.clone(), value.serialize()))
                .collect(),
        )
    }

    fn from_serialized(serialized: &Serialized, registry: &TypeRegistry) -> Result<Self, DecodeError> {
        BTreeMap::<String, T>::from_serialized(serialized, registry)
            .map(|entries| entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_encode_to_literals() {
        assert_eq!("Bob".to_string().serialize(), Serialized::Str("Bob".into()));
        assert_eq!(20i64.serialize(), Serialized::Integer(20));
        assert_eq!(7u32.serialize(), Serialized::Integer(7));
        assert_eq!(0.5f32.serialize(), Serialized::FloatingPoint(0.5));
    }

    #[test]
    fn test_primitives_decode_from_literals() {
        let registry = TypeRegistry::new();
        assert_eq!(
            String::from_serialized(&Serialized::Str("x".into()), &registry).unwrap(),
            "x"
        );
        assert_eq!(
            i32::from_serialized(&Serialized::Integer(-3), &registry).unwrap(),
            -3
        );
        assert_eq!(
            u32::from_serialized(&Serialized::Integer(-3), &registry).unwrap_err(),
            DecodeError::OutOfRange {
                value: -3,
                target: "u32"
            }
        );
        assert_eq!(
            String::from_serialized(&Serialized::Integer(1), &registry).unwrap_err(),
            DecodeError::Mismatch {
                expected: "string",
                found: "int"
            }
        );
    }

    #[test]
    fn test_vec_round_trip() {
        let registry = TypeRegistry::new();
        let values = vec![1i64, 2];
        let encoded = values.serialize();
        assert_eq!(
            encoded,
            Serialized::Array(vec![Serialized::Integer(1), Serialized::Integer(2)])
        );
        assert_eq!(Vec::<i64>::from_serialized(&encoded, &registry).unwrap(), values);
    }

    #[test]
    fn test_vec_fails_as_a_whole() {
        let registry = TypeRegistry::new();
        let encoded = Serialized::Array(vec![Serialized::Integer(1), Serialized::Str("2".into())]);
        let err = Vec::<i64>::from_serialized(&encoded, &registry).unwrap_err();
        assert!(matches!(err, DecodeError::AtIndex { index: 1, .. }));
    }

    #[test]
    fn test_map_round_trip() {
        let registry = TypeRegistry::new();
        let mut scores = HashMap::new();
        scores.insert("alice".to_string(), 1.5f64);
        scores.insert("bob".to_string(), 2.0f64);

        let encoded = scores.serialize();
        assert!(matches!(&encoded, Serialized::Dict(entries) if entries.len() == 2));
        assert_eq!(
            HashMap::<String, f64>::from_serialized(&encoded, &registry).unwrap(),
            scores
        );
    }

    #[test]
    fn test_field_writer_omits_absent_optionals() {
        let mut fields = FieldWriter::new();
        fields
            .field("name", &"Bob".to_string())
            .optional::<i64>("age", &None)
            .optional("score", &Some(3i64));

        let dict = fields.into_dict();
        assert_eq!(dict.len(), 2);
        assert!(!dict.contains_key("age"));
        assert_eq!(dict.get("score"), Some(&Serialized::Integer(3)));
    }
}
