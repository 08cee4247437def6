//! Serialized → value.
//!
//! Literals and containers decode structurally. A custom-type envelope is
//! resolved through the [`TypeRegistry`]; an unknown name fails that subtree,
//! and any failure inside a container fails the whole container.

use tracing::debug;

use crate::encode::Serializable;
use crate::error::DecodeError;
use crate::registry::TypeRegistry;
use crate::serialized::Serialized;
use crate::value::{Fields, Value};

/// Decode a tree into a generic [`Value`].
pub fn decode(serialized: &Serialized, registry: &TypeRegistry) -> Result<Value, DecodeError> {
    match serialized {
        Serialized::Str(text) => Ok(Value::Str(text.clone())),
        Serialized::Integer(int) => Ok(Value::Integer(*int)),
        Serialized::FloatingPoint(float) => Ok(Value::Float(*float)),
        Serialized::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| decode(item, registry).map_err(|e| e.at_index(index)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Serialized::Dict(entries) => entries
            .iter()
            .map(|(key, value)| {
                decode(value, registry)
                    .map(|value| (key.clone(), value))
                    .map_err(|e| e.in_field(key))
            })
            .collect::<Result<Fields, _>>()
            .map(Value::Dict),
        Serialized::CustomType { type_name, data } => match registry.lookup(type_name) {
            Some(descriptor) => descriptor.construct(data, registry),
            None => {
                debug!(type_name = %type_name, "Cannot decode unregistered type");
                Err(DecodeError::UnknownType(type_name.clone()))
            }
        },
    }
}

/// Decode a tree into a concrete type.
pub fn decode_as<T: Serializable>(
    serialized: &Serialized,
    registry: &TypeRegistry,
) -> Result<T, DecodeError> {
    T::from_serialized(serialized, registry)
}

impl Serialized {
    /// Decode this tree into a generic [`Value`] using `registry`.
    pub fn decode(&self, registry: &TypeRegistry) -> Result<Value, DecodeError> {
        decode(self, registry)
    }
}
