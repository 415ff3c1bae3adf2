//! Error types for the core crate.

use thiserror::Error;

/// Failures while encoding or decoding stored records and keys.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The serializer rejected a record, or stored bytes did not parse.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A record was written by a format version this build cannot read.
    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version byte found in storage.
        found: u8,
        /// Version this build writes.
        expected: u8,
    },

    /// A stored record had no bytes at all.
    #[error("empty record")]
    EmptyRecord,

    /// A label does not fit the index key's length prefix.
    #[error("label too long: {0} bytes")]
    LabelTooLong(usize),
}

impl CoreError {
    /// Wrap a serializer error with what was being processed.
    pub(crate) fn encoding(what: &str, err: impl std::fmt::Display) -> Self {
        Self::Encoding(format!("{what}: {err}"))
    }
}
