//! Property values.
//!
//! Nodes and relationships carry a map of named [`Value`]s. Identifier
//! properties hold either a [`Value::String`] (random identifiers) or a
//! [`Value::Int`] (sequence identifiers); the remaining variants exist so that
//! application data can live next to them.
//!
//! ```
//! use graphuid_core::Value;
//!
//! let uuid = Value::from("6f1c-2b");
//! let seq = Value::from(7_i64);
//!
//! assert_eq!(uuid.as_str(), Some("6f1c-2b"));
//! assert_eq!(seq.as_int(), Some(7));
//! assert!(Value::Null.is_absent());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A property value on a node or relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Explicitly unset. Treated the same as a missing property.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    String(String),
}

impl Value {
    /// Whether this value stands for "no value".
    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer payload, if any.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        if let Self::Int(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// The text payload, if any.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Type name used when a value of the wrong type is rejected.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}
