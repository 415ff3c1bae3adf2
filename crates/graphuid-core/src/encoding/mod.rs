//! Serialization and key encoding for storage.
//!
//! # Encoding Traits
//!
//! - [`Encoder`] - Serialize types to bytes
//! - [`Decoder`] - Deserialize types from bytes
//! - [`Record`] - Marker for serde types stored as a version byte followed by a
//!   bincode payload; gets both traits for free
//!
//! [`Entity`](crate::types::Entity) and [`Edge`](crate::types::Edge) are records.
//!
//! # Key Encoding
//!
//! The [`keys`] module provides functions for encoding ordered keys that support
//! efficient range scans in key-value storage backends. Keys use prefixes to
//! partition the keyspace and big-endian encoding to preserve sort order.
//!
//! # Example
//!
//! ```
//! use graphuid_core::encoding::{Decoder, Encoder};
//! use graphuid_core::types::{Entity, EntityId};
//!
//! let entity = Entity::new(EntityId::new(1))
//!     .with_label("Person")
//!     .with_property("name", "Alice");
//!
//! let bytes = entity.encode().expect("encode");
//! let decoded = Entity::decode(&bytes).expect("decode");
//! assert_eq!(decoded, entity);
//! ```

pub mod keys;
mod record;
mod traits;

pub use traits::{Decoder, Encoder, Record, FORMAT_VERSION};
