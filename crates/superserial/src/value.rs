//! Decoded values.
//!
//! [`Value`] is what the generic decoder produces: literals, containers, and
//! registered custom types held behind a type-erased [`CustomValue`].
//! [`FromValue`] pulls typed Rust values back out of it, which is how an
//! aggregate's field-mapping constructor reads its fields.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::encode::{AutoSerializable, CustomSerializable};
use crate::error::DecodeError;
use crate::serialized::Serialized;

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Integer(i64),
    Float(f64),
    Array(Vec<Value>),
    Dict(Fields),
    Custom(CustomValue),
}

impl Value {
    /// Short description of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
            Value::Custom(custom) => custom.type_name(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(int) => Some(*int),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&Fields> {
        match self {
            Value::Dict(fields) => Some(fields),
            _ => None,
        }
    }

    /// Borrows the registered aggregate inside a `Custom` value.
    pub fn downcast_ref<T: CustomSerializable>(&self) -> Option<&T> {
        match self {
            Value::Custom(custom) => custom.downcast_ref(),
            _ => None,
        }
    }

    /// Re-encodes the value.
    ///
    /// Built-in wrapper envelopes (`Int`, `UInt`, `Float`, `String`) decode to
    /// plain literals, so their re-encoding is the bare literal without the
    /// wrapper. Registered aggregates and `Point`/`Color` keep their envelope.
    pub fn to_serialized(&self) -> Serialized {
        match self {
            Value::Str(text) => Serialized::Str(text.clone()),
            Value::Integer(int) => Serialized::Integer(*int),
            Value::Float(float) => Serialized::FloatingPoint(*float),
            Value::Array(items) => Serialized::Array(items.iter().map(Value::to_serialized).collect()),
            Value::Dict(fields) => Serialized::Dict(
                fields
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_serialized()))
                    .collect(),
            ),
            Value::Custom(custom) => custom.serialize(),
        }
    }
}

// =============================================================================
// Fields
// =============================================================================

/// Field name → decoded value mapping handed to aggregate constructors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a typed field.
    ///
    /// A missing key fails with [`DecodeError::MissingField`] unless `T` is an
    /// `Option`, in which case it reads as `None`. Errors carry the field name.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, DecodeError> {
        match self.0.get(name) {
            Some(value) => T::from_value(value).map_err(|e| e.in_field(name)),
            None => T::from_missing(name),
        }
    }

    /// Reads a field, falling back to `T::default()` when the key is absent.
    pub fn get_or_default<T: FromValue + Default>(&self, name: &str) -> Result<T, DecodeError> {
        Ok(self.get::<Option<T>>(name)?.unwrap_or_default())
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Fields(iter.into_iter().collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Custom values
// =============================================================================

/// Object-safe view of a registered aggregate.
trait DynSerializable: Any + Send + Sync + fmt::Debug {
    fn type_name(&self) -> &'static str;
    fn serialize_dyn(&self) -> Serialized;
    fn clone_boxed(&self) -> Box<dyn DynSerializable>;
    fn eq_dyn(&self, other: &dyn DynSerializable) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: CustomSerializable> DynSerializable for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn serialize_dyn(&self) -> Serialized {
        self.serialize()
    }

    fn clone_boxed(&self) -> Box<dyn DynSerializable> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn DynSerializable) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A decoded custom type whose concrete Rust type is known only at runtime.
pub struct CustomValue(Box<dyn DynSerializable>);

impl CustomValue {
    pub fn new<T: CustomSerializable>(value: T) -> Self {
        CustomValue(Box::new(value))
    }

    /// Registered name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn is<T: CustomSerializable>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: CustomSerializable>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn serialize(&self) -> Serialized {
        self.0.serialize_dyn()
    }
}

impl Clone for CustomValue {
    fn clone(&self) -> Self {
        CustomValue(self.0.clone_boxed())
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(other.0.as_ref())
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

// =============================================================================
// Typed extraction
// =============================================================================

/// Typed extraction from a decoded [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, DecodeError>;

    /// Called when a field is absent. Required by default.
    fn from_missing(name: &str) -> Result<Self, DecodeError> {
        Err(DecodeError::MissingField(name.to_string()))
    }
}

fn mismatch(expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::Mismatch {
        expected,
        found: value.kind(),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        value.as_i64().ok_or_else(|| mismatch("integer", value))
    }
}

macro_rules! narrow_int_from_value {
    ($($ty:ty),*) => {$(
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, DecodeError> {
                let int = i64::from_value(value)?;
                <$ty>::try_from(int).map_err(|_| DecodeError::OutOfRange {
                    value: int,
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

narrow_int_from_value!(i32, u32, u64, usize);

impl FromValue for f64 {
    /// Integral literals are accepted as floats.
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Float(float) => Ok(*float),
            Value::Integer(int) => Ok(*int as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        f64::from_value(value).map(|float| float as f32)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        T::from_value(value).map(Some)
    }

    fn from_missing(_name: &str) -> Result<Self, DecodeError> {
        Ok(None)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| T::from_value(item).map_err(|e| e.at_index(index)))
                .collect(),
            other => Err(mismatch("array", other)),
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Dict(fields) => fields
                .iter()
                .map(|(name, item)| {
                    T::from_value(item)
                        .map(|item| (name.to_string(), item))
                        .map_err(|e| e.in_field(name))
                })
                .collect(),
            other => Err(mismatch("dict", other)),
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        BTreeMap::<String, T>::from_value(value).map(|map| map.into_iter().collect())
    }
}

/// [`FromValue`] for a registered custom type: the value must hold exactly `T`.
pub fn custom_from_value<T: CustomSerializable>(value: &Value) -> Result<T, DecodeError> {
    match value {
        Value::Custom(custom) => {
            custom
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| DecodeError::WrongType {
                    expected: T::TYPE_NAME.to_string(),
                    found: custom.type_name().to_string(),
                })
        }
        other => Err(mismatch(T::TYPE_NAME, other)),
    }
}

/// [`FromValue`] for an auto-serializable type: a custom value of type `T`,
/// or a plain dict read through `T`'s field-mapping constructor.
pub fn auto_from_value<T: AutoSerializable>(value: &Value) -> Result<T, DecodeError> {
    match value {
        Value::Dict(fields) => T::from_fields(fields),
        other => custom_from_value(other),
    }
}
