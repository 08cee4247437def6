//! Built-in custom types.
//!
//! Both are registered in every [`TypeRegistry`] under their type names.
//! Documents written by older Apple-platform writers name them `CGPoint` and
//! `SSColor`; those names decode too, but encoding always writes the
//! canonical name.

use std::fmt;
use std::str::FromStr;

use crate::encode::{
    AutoSerializable, CustomSerializable, FieldWriter, Serializable, deserialize_auto,
    serialize_auto,
};
use crate::error::DecodeError;
use crate::registry::TypeRegistry;
use crate::serialized::Serialized;
use crate::value::{Fields, FromValue, Value, auto_from_value, custom_from_value};

/// Legacy type name accepted for [`Point`] on decode.
pub(crate) const POINT_ALIAS: &str = "CGPoint";
/// Legacy type name accepted for [`Color`] on decode.
pub(crate) const COLOR_ALIAS: &str = "SSColor";

/// A 2D point. Encoded from its fields; a missing coordinate reads as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl CustomSerializable for Point {
    const TYPE_NAME: &'static str = "Point";
}

impl AutoSerializable for Point {
    fn write_fields(&self, fields: &mut FieldWriter) {
        fields.field("x", &self.x).field("y", &self.y);
    }

    fn from_fields(fields: &Fields) -> Result<Self, DecodeError> {
        Ok(Self {
            x: fields.get_or_default("x")?,
            y: fields.get_or_default("y")?,
        })
    }
}

impl Serializable for Point {
    fn serialize(&self) -> Serialized {
        serialize_auto(self)
    }

    fn from_serialized(serialized: &Serialized, registry: &TypeRegistry) -> Result<Self, DecodeError> {
        match serialized {
            Serialized::CustomType { type_name, data } if type_name == POINT_ALIAS => {
                deserialize_auto(data, registry)
            }
            other => deserialize_auto(other, registry),
        }
    }
}

impl FromValue for Point {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        auto_from_value(value)
    }
}

/// An RGBA color, encoded as a `Str` payload of the form `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xff)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = DecodeError;

    /// Parses `#rrggbbaa`, or `#rrggbb` with an opaque alpha.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DecodeError::InvalidPayload {
            type_name: Self::TYPE_NAME.to_string(),
            reason: format!("{reason}: '{text}'"),
        };

        let digits = text.strip_prefix('#').ok_or_else(|| invalid("missing '#'"))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("not a hex color"));
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid("not a hex color"))?;
        let [r, g, b, a] = match digits.len() {
            8 => value.to_be_bytes(),
            6 => (value << 8 | 0xff).to_be_bytes(),
            _ => return Err(invalid("expected 6 or 8 hex digits")),
        };
        Ok(Self::rgba(r, g, b, a))
    }
}

impl CustomSerializable for Color {
    const TYPE_NAME: &'static str = "Color";
}

impl Serializable for Color {
    fn serialize(&self) -> Serialized {
        Serialized::custom_type_with(Self::TYPE_NAME, Serialized::Str(self.to_hex()))
    }

    /// Accepts the envelope or its bare `Str` payload.
    fn from_serialized(serialized: &Serialized, registry: &TypeRegistry) -> Result<Self, DecodeError> {
        match serialized {
            Serialized::CustomType { type_name, data }
                if type_name == Self::TYPE_NAME || type_name == COLOR_ALIAS =>
            {
                Self::from_serialized(data, registry)
            }
            Serialized::CustomType { type_name, .. } => Err(DecodeError::WrongType {
                expected: Self::TYPE_NAME.to_string(),
                found: type_name.clone(),
            }),
            Serialized::Str(text) => text.parse(),
            other => Err(DecodeError::Mismatch {
                expected: "string",
                found: other.case().as_str(),
            }),
        }
    }
}

impl FromValue for Color {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Str(text) => text.parse(),
            other => custom_from_value(other),
        }
    }
}
