//! Mismatch errors reported by the schema matcher.
use crate::path::ValuePath;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Dynamic kind of a JSON value, used in type-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        };
        f.write_str(name)
    }
}

/// A single structural mismatch between schema and target.
///
/// The matcher stops at the first mismatch on a branch, so every failed check
/// carries exactly one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("type mismatch on {path}, expected {expected}, got {actual}")]
    TypeMismatch {
        path: ValuePath,
        expected: Kind,
        actual: Kind,
    },

    #[error("value mismatch on {path}, expected {expected}, got {actual}")]
    ValueMismatch {
        path: ValuePath,
        expected: Value,
        actual: Value,
    },

    #[error("map mismatch on {path}, expected {expected}")]
    MissingKey { path: ValuePath, expected: Value },

    #[error("length mismatch on {path}, expected at least {expected_at_least}, got {got}")]
    LengthMismatch {
        path: ValuePath,
        expected_at_least: usize,
        got: usize,
    },

    #[error("slice mismatch on {path}, expected {expected}")]
    SliceMismatch { path: ValuePath, expected: Value },

    #[error("variable {name} not found")]
    UnknownVariable { name: String },

    #[error("variable mismatch on {path}, expected {expected}, got {actual}")]
    VariableMismatch {
        path: ValuePath,
        expected: Value,
        actual: Value,
    },
}
