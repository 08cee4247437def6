//! Tag unwrapper: raw JSON tree → [`Serialized`].
//!
//! Object shapes are classified as follows:
//! - `{"ss_case": tag, "ss_value": payload}`: the payload is read according
//!   to `tag`; `"type"` (or legacy `"struct"`) payloads are custom-type objects
//! - `{"ss_typeName": name, "ss_data": payload}`: a bare custom-type envelope
//! - any other object: a plain `Dict`
//!
//! Arrays, strings and numbers map onto `Array`, `Str`, `Integer` and
//! `FloatingPoint`. Nodes with no representation (null, booleans) are
//! rejected instead of being replaced by a placeholder.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::codec::{CASE_KEY, DATA_KEY, TYPE_NAME_KEY, VALUE_KEY};
use crate::error::UnwrapError;
use crate::serialized::{Case, Dict, Serialized};

/// Interprets a raw JSON tree as a [`Serialized`] tree.
pub fn unwrap(node: &Value) -> Result<Serialized, UnwrapError> {
    unwrap_node(node).inspect_err(|err| debug!(error = %err, "failed to unwrap JSON node"))
}

impl Serialized {
    /// Interprets a raw JSON tree, tagged or plain.
    pub fn from_json(node: &Value) -> Result<Self, UnwrapError> {
        unwrap(node)
    }
}

fn unwrap_node(node: &Value) -> Result<Serialized, UnwrapError> {
    match node {
        Value::Object(object) => unwrap_object(object),
        Value::Array(items) => unwrap_array(items),
        Value::String(text) => Ok(Serialized::Str(text.clone())),
        Value::Number(number) => unwrap_number(number),
        Value::Null | Value::Bool(_) => Err(UnwrapError::UnrecognizedShape {
            found: kind_of(node),
        }),
    }
}

fn unwrap_object(object: &Map<String, Value>) -> Result<Serialized, UnwrapError> {
    if let Some(tag) = object.get(CASE_KEY) {
        let case = tag
            .as_str()
            .and_then(Case::from_tag)
            .ok_or_else(|| UnwrapError::UnknownCase(tag.to_string()))?;
        let payload = object
            .get(VALUE_KEY)
            .ok_or(UnwrapError::MissingKey(VALUE_KEY))?;
        return unwrap_case(case, payload).map_err(|e| e.in_key(VALUE_KEY));
    }

    if object.contains_key(TYPE_NAME_KEY) && object.contains_key(DATA_KEY) {
        return unwrap_custom(object);
    }

    unwrap_entries(object).map(Serialized::Dict)
}

fn unwrap_case(case: Case, payload: &Value) -> Result<Serialized, UnwrapError> {
    let mismatch = |expected| UnwrapError::CaseMismatch {
        case: case.as_str(),
        expected,
        found: kind_of(payload),
    };

    match case {
        Case::Type => payload
            .as_object()
            .ok_or_else(|| mismatch("an object"))
            .and_then(unwrap_custom),
        Case::Dict => payload
            .as_object()
            .ok_or_else(|| mismatch("an object"))
            .and_then(unwrap_entries)
            .map(Serialized::Dict),
        Case::Array => payload
            .as_array()
            .ok_or_else(|| mismatch("an array"))
            .and_then(|items| unwrap_array(items)),
        Case::Str => payload
            .as_str()
            .map(|text| Serialized::Str(text.to_string()))
            .ok_or_else(|| mismatch("a string")),
        Case::Int => match payload {
            Value::Number(number) if !number.is_f64() => unwrap_number(number),
            _ => Err(mismatch("an integer")),
        },
        Case::Float => payload
            .as_f64()
            .map(Serialized::FloatingPoint)
            .ok_or_else(|| mismatch("a number")),
    }
}

fn unwrap_custom(object: &Map<String, Value>) -> Result<Serialized, UnwrapError> {
    let type_name = object
        .get(TYPE_NAME_KEY)
        .ok_or(UnwrapError::MissingKey(TYPE_NAME_KEY))?;
    let type_name = type_name.as_str().ok_or(UnwrapError::CaseMismatch {
        case: Case::Type.as_str(),
        expected: "a string type name",
        found: kind_of(type_name),
    })?;
    let data = object
        .get(DATA_KEY)
        .ok_or(UnwrapError::MissingKey(DATA_KEY))?;
    let data = unwrap_node(data).map_err(|e| e.in_key(DATA_KEY))?;
    Ok(Serialized::custom_type_with(type_name, data))
}

fn unwrap_entries(object: &Map<String, Value>) -> Result<Dict, UnwrapError> {
    object
        .iter()
        .map(|(key, value)| {
            unwrap_node(value)
                .map(|node| (key.clone(), node))
                .map_err(|e| e.in_key(key))
        })
        .collect()
}

fn unwrap_array(items: &[Value]) -> Result<Serialized, UnwrapError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| unwrap_node(item).map_err(|e| e.at_index(index)))
        .collect::<Result<Vec<_>, _>>()
        .map(Serialized::Array)
}

/// Integral literals become `Integer`, fractional ones `FloatingPoint`.
fn unwrap_number(number: &Number) -> Result<Serialized, UnwrapError> {
    if let Some(int) = number.as_i64() {
        return Ok(Serialized::Integer(int));
    }
    if number.is_u64() {
        return Err(UnwrapError::IntegerOutOfRange(number.to_string()));
    }
    number
        .as_f64()
        .map(Serialized::FloatingPoint)
        .ok_or_else(|| UnwrapError::UnrecognizedShape { found: "number" })
}

fn kind_of(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
