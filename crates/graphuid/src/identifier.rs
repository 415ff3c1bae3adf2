//! Identifier values.
//!
//! An [`Identifier`] is either text (the random generator's UUIDs, or anything
//! a caller writes) or an integer (the sequence generator). Identifiers are
//! stored on elements as ordinary property values and in the index under a
//! tagged byte encoding that sorts numbers before text, numbers numerically
//! and text bytewise.

use std::fmt;

use graphuid_core::Value;
use serde::{Deserialize, Serialize};

/// Key tag for integer identifiers.
const TAG_NUMBER: u8 = 0x01;
/// Key tag for text identifiers.
const TAG_TEXT: u8 = 0x02;

/// An identifier value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identifier {
    /// An integer identifier.
    Number(i64),
    /// A text identifier.
    Text(String),
}

impl Identifier {
    /// Read an identifier from a property value.
    ///
    /// Returns `None` for value types that cannot hold an identifier.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Self::Number(*n)),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// The property value that stores this identifier.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Int(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Remove every `-` from a text identifier. Numbers are returned unchanged.
    #[must_use]
    pub fn strip_hyphens(self) -> Self {
        match self {
            Self::Text(s) if s.contains('-') => Self::Text(s.replace('-', "")),
            other => other,
        }
    }

    /// Encode as an index key.
    #[must_use]
    pub fn encode_key(&self) -> Vec<u8> {
        match self {
            Self::Number(n) => {
                let mut key = Vec::with_capacity(9);
                key.push(TAG_NUMBER);
                // Flip the sign bit so negative numbers sort first
                key.extend_from_slice(&(*n ^ i64::MIN).to_be_bytes());
                key
            }
            Self::Text(s) => {
                let mut key = Vec::with_capacity(1 + s.len());
                key.push(TAG_TEXT);
                key.extend_from_slice(s.as_bytes());
                key
            }
        }
    }

    /// Decode an index key produced by [`encode_key`](Self::encode_key).
    #[must_use]
    pub fn decode_key(key: &[u8]) -> Option<Self> {
        match key.split_first()? {
            (&TAG_NUMBER, rest) => {
                let raw = i64::from_be_bytes(rest.try_into().ok()?);
                Some(Self::Number(raw ^ i64::MIN))
            }
            (&TAG_TEXT, rest) => String::from_utf8(rest.to_vec()).ok().map(Self::Text),
            _ => None,
        }
    }

    /// The text, if this is a text identifier.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// The number, if this is an integer identifier.
    #[must_use]
    pub const fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
