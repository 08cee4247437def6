//! Error types for superserial.
//!
//! Each failure kind is local and explicit: a failure anywhere in a subtree
//! fails that subtree and is reported by the enclosing container.

use thiserror::Error;

/// Result type for superserial operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error covering the whole text → value pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Input text is not valid JSON
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// A tree could not be written as text
    #[error("Render error: {0}")]
    Render(#[source] serde_json::Error),

    /// A JSON node does not match any envelope shape
    #[error("Unwrap error: {0}")]
    Unwrap(#[from] UnwrapError),

    /// A tree could not be turned back into a value
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Failure to interpret a raw JSON node as a [`Serialized`](crate::Serialized) node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnwrapError {
    /// null, booleans and anything else without a representation
    #[error("unrecognized node shape: {found}")]
    UnrecognizedShape { found: &'static str },

    #[error("unknown case tag '{0}'")]
    UnknownCase(String),

    #[error("envelope is missing key '{0}'")]
    MissingKey(&'static str),

    /// The payload under `ss_value` does not fit the declared case
    #[error("case '{case}' expects {expected}, found {found}")]
    CaseMismatch {
        case: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("integer literal {0} does not fit in i64")]
    IntegerOutOfRange(String),

    #[error("in '{key}': {source}")]
    InKey {
        key: String,
        #[source]
        source: Box<UnwrapError>,
    },

    #[error("at index {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<UnwrapError>,
    },
}

/// Failure to reconstruct a value from a [`Serialized`](crate::Serialized) tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A custom-type envelope names a type absent from the registry
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// A typed decode was asked for one custom type and found another
    #[error("expected type '{expected}', found '{found}'")]
    WrongType { expected: String, found: String },

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("integer {value} out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },

    /// An adapter rejected a payload of the right shape
    #[error("invalid payload for '{type_name}': {reason}")]
    InvalidPayload { type_name: String, reason: String },

    #[error("in field '{field}': {source}")]
    InField {
        field: String,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("at index {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

impl UnwrapError {
    pub(crate) fn in_key(self, key: &str) -> Self {
        UnwrapError::InKey {
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        UnwrapError::AtIndex {
            index,
            source: Box::new(self),
        }
    }
}

impl DecodeError {
    pub(crate) fn in_field(self, field: &str) -> Self {
        DecodeError::InField {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        DecodeError::AtIndex {
            index,
            source: Box::new(self),
        }
    }

    /// The innermost error, past any field or index context.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::InField { source, .. } | DecodeError::AtIndex { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
