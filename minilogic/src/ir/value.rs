//! Runtime values for the equivalence checker

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit integer
    Int(i64),
    /// Boolean
    Bool(bool),
    /// String
    Str(String),
    /// Absent value
    Nil,
    /// Placeholder for a value unknown at verification time
    Symbolic(String),
}

impl Value {
    /// True when the value is fully known
    pub fn is_concrete(&self) -> bool {
        !matches!(self, Value::Symbolic(_))
    }

    /// Try to convert to i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Nil => "nil",
            Value::Symbolic(_) => "symbolic",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Nil => write!(f, "nil"),
            Value::Symbolic(name) => write!(f, "{name}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            // Symbolic values compare by name alone. Two placeholders that
            // render to the same name are treated as the same value even if
            // they were synthesized from different structures.
            (Value::Symbolic(a), Value::Symbolic(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}
