//! The tagged intermediate representation.
//!
//! Every value is encoded into a [`Serialized`] tree before it is rendered to
//! text, and every document is unwrapped into one before it is decoded. Trees
//! are built bottom-up from already-built children, so they are always finite.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::encode::Serializable;

/// Mapping payload of a [`Serialized::Dict`]. Key order carries no meaning.
pub type Dict = BTreeMap<String, Serialized>;

/// Tagged intermediate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Serialized {
    /// A named aggregate. `data` is conventionally a `Dict`, but each type
    /// decides its own payload shape.
    CustomType {
        type_name: String,
        data: Box<Serialized>,
    },
    Dict(Dict),
    Array(Vec<Serialized>),
    Str(String),
    Integer(i64),
    FloatingPoint(f64),
}

impl Serialized {
    /// Builds a custom-type node whose payload is a `Dict` of `fields`.
    pub fn custom_type(type_name: impl Into<String>, fields: Dict) -> Self {
        Serialized::CustomType {
            type_name: type_name.into(),
            data: Box::new(Serialized::Dict(fields)),
        }
    }

    /// Builds a custom-type node around an arbitrary payload.
    pub fn custom_type_with(type_name: impl Into<String>, data: Serialized) -> Self {
        Serialized::CustomType {
            type_name: type_name.into(),
            data: Box::new(data),
        }
    }

    /// Builds an `Array` by encoding each element.
    pub fn from_values<T: Serializable>(values: &[T]) -> Self {
        Serialized::Array(values.iter().map(Serializable::serialize).collect())
    }

    /// The case tag this node renders with.
    pub fn case(&self) -> Case {
        match self {
            Serialized::CustomType { .. } => Case::Type,
            Serialized::Dict(_) => Case::Dict,
            Serialized::Array(_) => Case::Array,
            Serialized::Str(_) => Case::Str,
            Serialized::Integer(_) => Case::Int,
            Serialized::FloatingPoint(_) => Case::Float,
        }
    }

    /// Type name of a custom-type node.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Serialized::CustomType { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Serialized::CustomType { data, .. } => data.node_count(),
            Serialized::Dict(entries) => entries.values().map(Serialized::node_count).sum(),
            Serialized::Array(items) => items.iter().map(Serialized::node_count).sum(),
            _ => 0,
        }
    }

    /// Every custom type name referenced anywhere in the tree.
    pub fn custom_type_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_type_names(&mut names);
        names
    }

    fn collect_type_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Serialized::CustomType { type_name, data } => {
                names.insert(type_name);
                data.collect_type_names(names);
            }
            Serialized::Dict(entries) => {
                entries.values().for_each(|v| v.collect_type_names(names));
            }
            Serialized::Array(items) => items.iter().for_each(|v| v.collect_type_names(names)),
            _ => {}
        }
    }
}

impl From<String> for Serialized {
    fn from(value: String) -> Self {
        Serialized::Str(value)
    }
}

impl From<&str> for Serialized {
    fn from(value: &str) -> Self {
        Serialized::Str(value.to_string())
    }
}

impl From<i64> for Serialized {
    fn from(value: i64) -> Self {
        Serialized::Integer(value)
    }
}

impl From<f64> for Serialized {
    fn from(value: f64) -> Self {
        Serialized::FloatingPoint(value)
    }
}

impl From<Vec<Serialized>> for Serialized {
    fn from(value: Vec<Serialized>) -> Self {
        Serialized::Array(value)
    }
}

impl From<Dict> for Serialized {
    fn from(value: Dict) -> Self {
        Serialized::Dict(value)
    }
}

/// Case tag written under `ss_case`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    Type,
    Dict,
    Array,
    Str,
    Int,
    Float,
}

impl Case {
    /// Tag text as written on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Case::Type => "type",
            Case::Dict => "dict",
            Case::Array => "array",
            Case::Str => "string",
            Case::Int => "int",
            Case::Float => "float",
        }
    }

    /// Parses a wire tag. `"struct"` is accepted as the legacy spelling of `"type"`.
    pub fn from_tag(tag: &str) -> Option<Case> {
        match tag {
            "type" | "struct" => Some(Case::Type),
            "dict" => Some(Case::Dict),
            "array" => Some(Case::Array),
            "string" => Some(Case::Str),
            "int" => Some(Case::Int),
            "float" => Some(Case::Float),
            _ => None,
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_type_wraps_fields_in_dict() {
        let mut fields = Dict::new();
        fields.insert("name".to_string(), Serialized::from("Bob"));

        let node = Serialized::custom_type("Person", fields.clone());

        assert_eq!(
            node,
            Serialized::CustomType {
                type_name: "Person".to_string(),
                data: Box::new(Serialized::Dict(fields)),
            }
        );
        assert_eq!(node.type_name(), Some("Person"));
        assert_eq!(node.case(), Case::Type);
    }

    #[test]
    fn test_from_values_encodes_each_element() {
        let node = Serialized::from_values(&[1i64, 2]);
        assert_eq!(
            node,
            Serialized::Array(vec![Serialized::Integer(1), Serialized::Integer(2)])
        );
    }

    #[test]
    fn test_case_tags() {
        for case in [
            Case::Type,
            Case::Dict,
            Case::Array,
            Case::Str,
            Case::Int,
            Case::Float,
        ] {
            assert_eq!(Case::from_tag(case.as_str()), Some(case));
        }
        assert_eq!(Case::from_tag("struct"), Some(Case::Type));
        assert_eq!(Case::from_tag("bool"), None);
    }

    #[test]
    fn test_node_count_and_type_names() {
        let mut inner = Dict::new();
        inner.insert("x".to_string(), Serialized::FloatingPoint(1.5));
        let point = Serialized::custom_type("Point", inner);
        let tree = Serialized::Array(vec![point.clone(), point, Serialized::from("tail")]);

        // array + 2 * (type + dict + float) + str
        assert_eq!(tree.node_count(), 8);
        assert_eq!(
            tree.custom_type_names().into_iter().collect::<Vec<_>>(),
            vec!["Point"]
        );
    }
}
