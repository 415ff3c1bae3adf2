//! Encoding and decoding traits for stored records.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::CoreError;

/// Format version for serialized records.
///
/// This version number is the first byte of every stored record.
pub const FORMAT_VERSION: u8 = 1;

/// A type that can be written to storage as bytes.
pub trait Encoder: Sized {
    /// Encode into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer rejects the value.
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf)?;
        Ok(buf)
    }

    /// Append the encoding to `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer rejects the value.
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError>;
}

/// A type that can be read back from stored bytes.
pub trait Decoder: Sized {
    /// Decode a value.
    ///
    /// # Errors
    ///
    /// Returns an error on empty, truncated, or foreign-version input.
    fn decode(bytes: &[u8]) -> Result<Self, CoreError>;
}

/// A serde type stored as a version byte followed by a bincode payload.
///
/// Implementing this marker is enough to get [`Encoder`] and [`Decoder`].
pub trait Record: Serialize + DeserializeOwned {}

impl<T: Record> Encoder for T {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(FORMAT_VERSION);
        bincode::serde::encode_into_std_write(self, buf, bincode::config::standard())
            .map_err(|e| CoreError::encoding("failed to serialize record", e))?;
        Ok(())
    }
}

impl<T: Record> Decoder for T {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let (&version, payload) = bytes.split_first().ok_or(CoreError::EmptyRecord)?;
        if version != FORMAT_VERSION {
            return Err(CoreError::UnsupportedVersion { found: version, expected: FORMAT_VERSION });
        }
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map(|(record, _)| record)
            .map_err(|e| CoreError::encoding("failed to deserialize record", e))
    }
}
