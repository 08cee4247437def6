//! Type registry.
//!
//! Maps a type name found in a custom-type envelope to the constructor that
//! rebuilds the value. Two sets are consulted: the caller-supplied set, then a
//! fixed built-in set (`Int`, `UInt`, `Float`, `String`, `Point`, `Color`,
//! plus the legacy names `CGPoint` and `SSColor`). A caller type that reuses
//! a built-in name shadows it.
//!
//! The caller set is replaced wholesale on every [`TypeRegistry::register`]
//! call. Readers take a cheap snapshot, so concurrent decodes never observe a
//! half-written set.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{info, trace};

use crate::builtins::{COLOR_ALIAS, Color, POINT_ALIAS, Point};
use crate::encode::CustomSerializable;
use crate::error::DecodeError;
use crate::serialized::Serialized;
use crate::value::{CustomValue, Value};

/// Builds a decoded value from the payload (`ss_data`) of a custom-type envelope.
pub type Constructor = fn(&Serialized, &TypeRegistry) -> Result<Value, DecodeError>;

/// A registry entry: canonical type name plus decode constructor.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    construct: Constructor,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, construct: Constructor) -> Self {
        Self {
            name: name.into(),
            construct,
        }
    }

    /// Descriptor for a Rust type, decoded through its [`Serializable`](crate::Serializable) impl.
    pub fn of<T: CustomSerializable>() -> Self {
        Self::new(T::TYPE_NAME, construct_custom::<T>)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(&self, data: &Serialized, registry: &TypeRegistry) -> Result<Value, DecodeError> {
        (self.construct)(data, registry)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn construct_custom<T: CustomSerializable>(
    data: &Serialized,
    registry: &TypeRegistry,
) -> Result<Value, DecodeError> {
    T::from_serialized(data, registry).map(|value| Value::Custom(CustomValue::new(value)))
}

/// Registry of decodable custom types.
pub struct TypeRegistry {
    builtins: HashMap<String, TypeDescriptor>,
    custom: RwLock<Arc<[TypeDescriptor]>>,
}

impl TypeRegistry {
    /// Create a registry holding only the built-in types.
    pub fn new() -> Self {
        let builtins = builtin_descriptors()
            .into_iter()
            .map(|descriptor| (descriptor.name().to_string(), descriptor))
            .collect();

        Self {
            builtins,
            custom: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Create a registry with `types` already registered.
    pub fn with_types(types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let registry = Self::new();
        registry.register(types);
        registry
    }

    /// Replace the caller-supplied set. Types registered earlier and absent
    /// from `types` stop resolving.
    pub fn register(&self, types: impl IntoIterator<Item = TypeDescriptor>) {
        let types: Arc<[TypeDescriptor]> = types.into_iter().collect();
        info!(
            count = types.len(),
            types = ?types.iter().map(TypeDescriptor::name).collect::<Vec<_>>(),
            "Replacing registered types"
        );
        *self.custom.write().unwrap_or_else(PoisonError::into_inner) = types;
    }

    /// Find the descriptor for `type_name`, caller-supplied types first.
    pub fn lookup(&self, type_name: &str) -> Option<TypeDescriptor> {
        let found = self
            .snapshot()
            .iter()
            .find(|descriptor| descriptor.name() == type_name)
            .cloned()
            .or_else(|| self.builtins.get(type_name).cloned());
        trace!(type_name, found = found.is_some(), "Type lookup");
        found
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    /// Every resolvable name, sorted and deduplicated.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .snapshot()
            .iter()
            .map(|descriptor| descriptor.name().to_string())
            .chain(self.builtins.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn snapshot(&self) -> Arc<[TypeDescriptor]> {
        Arc::clone(&self.custom.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

// =============================================================================
// Built-ins
// =============================================================================

fn builtin_descriptors() -> [TypeDescriptor; 8] {
    [
        TypeDescriptor::new("Int", construct_int),
        TypeDescriptor::new("UInt", construct_uint),
        TypeDescriptor::new("Float", construct_float),
        TypeDescriptor::new("String", construct_string),
        TypeDescriptor::of::<Point>(),
        TypeDescriptor::of::<Color>(),
        TypeDescriptor::new(POINT_ALIAS, construct_custom::<Point>),
        TypeDescriptor::new(COLOR_ALIAS, construct_custom::<Color>),
    ]
}

fn payload_mismatch(expected: &'static str, data: &Serialized) -> DecodeError {
    DecodeError::Mismatch {
        expected,
        found: data.case().as_str(),
    }
}

fn construct_int(data: &Serialized, _: &TypeRegistry) -> Result<Value, DecodeError> {
    match data {
        Serialized::Integer(int) => Ok(Value::Integer(*int)),
        other => Err(payload_mismatch("integer", other)),
    }
}

fn construct_uint(data: &Serialized, _: &TypeRegistry) -> Result<Value, DecodeError> {
    match data {
        Serialized::Integer(int) if *int >= 0 => Ok(Value::Integer(*int)),
        Serialized::Integer(int) => Err(DecodeError::OutOfRange {
            value: *int,
            target: "UInt",
        }),
        other => Err(payload_mismatch("integer", other)),
    }
}

fn construct_float(data: &Serialized, _: &TypeRegistry) -> Result<Value, DecodeError> {
    match data {
        Serialized::FloatingPoint(float) => Ok(Value::Float(*float)),
        Serialized::Integer(int) => Ok(Value::Float(*int as f64)),
        other => Err(payload_mismatch("float", other)),
    }
}

fn construct_string(data: &Serialized, _: &TypeRegistry) -> Result<Value, DecodeError> {
    match data {
        Serialized::Str(text) => Ok(Value::Str(text.clone())),
        other => Err(payload_mismatch("string", other)),
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// The process-wide registry used by the façade functions that take no
/// explicit registry. Populate it with [`register`] at startup.
pub fn global() -> &'static TypeRegistry {
    GLOBAL.get_or_init(TypeRegistry::new)
}

/// Replace the caller-supplied set of the process-wide registry.
pub fn register(types: impl IntoIterator<Item = TypeDescriptor>) {
    global().register(types);
}
