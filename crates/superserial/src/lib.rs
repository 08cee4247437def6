//! Self-describing, tag-annotated JSON serialization.
//!
//! Values are encoded into a [`Serialized`] tree, rendered as JSON in which
//! every node carries its case (`ss_case`) next to its payload (`ss_value`),
//! and rebuilt on the way back by consulting a [`TypeRegistry`] for every
//! custom-type envelope.
//!
//! ```ignore
//! use superserial::{AutoSerializable, TypeDescriptor};
//!
//! #[derive(Debug, Clone, PartialEq, AutoSerializable)]
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! superserial::register([TypeDescriptor::of::<Person>()]);
//!
//! let text = superserial::to_string(&Person { name: "Bob".into(), age: 20 })?;
//! let person: Person = superserial::from_str(&text)?;
//! ```

pub mod builtins;
pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod registry;
pub mod serialized;
pub mod unwrap;
pub mod value;

pub use builtins::{Color, Point};
pub use codec::RenderOptions;
pub use decode::{decode, decode_as};
pub use encode::{CustomSerializable, FieldWriter, Serializable};
pub use error::{DecodeError, Error, Result, UnwrapError};
pub use registry::{TypeDescriptor, TypeRegistry, global, register};
pub use serialized::{Case, Dict, Serialized};
pub use value::{CustomValue, Fields, FromValue, Value};

pub use encode::AutoSerializable;
#[cfg(feature = "derive")]
pub use superserial_derive::AutoSerializable;

/// Encode and render `value` as compact, ASCII-only envelope JSON.
pub fn to_string<T: Serializable>(value: &T) -> Result<String> {
    value.serialize().render()
}

pub fn to_string_with<T: Serializable>(value: &T, options: &RenderOptions) -> Result<String> {
    value.serialize().render_with(options)
}

pub fn to_vec<T: Serializable>(value: &T) -> Result<Vec<u8>> {
    value.serialize().to_vec()
}

/// Parse, unwrap and decode envelope JSON against the process-wide registry.
pub fn from_str<T: Serializable>(text: &str) -> Result<T> {
    from_str_with(text, global())
}

pub fn from_str_with<T: Serializable>(text: &str, registry: &TypeRegistry) -> Result<T> {
    let serialized: Serialized = text.parse()?;
    Ok(T::from_serialized(&serialized, registry)?)
}

pub fn from_slice<T: Serializable>(bytes: &[u8]) -> Result<T> {
    from_slice_with(bytes, global())
}

pub fn from_slice_with<T: Serializable>(bytes: &[u8], registry: &TypeRegistry) -> Result<T> {
    let serialized = Serialized::from_slice(bytes)?;
    Ok(T::from_serialized(&serialized, registry)?)
}

/// Decode envelope JSON into a generic [`Value`] against the process-wide registry.
pub fn from_str_value(text: &str) -> Result<Value> {
    from_str_value_with(text, global())
}

pub fn from_str_value_with(text: &str, registry: &TypeRegistry) -> Result<Value> {
    let serialized: Serialized = text.parse()?;
    Ok(decode(&serialized, registry)?)
}
