//! graphuid core
//!
//! This crate provides the fundamental types shared by the graphuid crates: the
//! host graph's elements, the transaction diff that commit hooks observe, and
//! the error types that cross crate boundaries.
//!
//! # Overview
//!
//! - **Identifiers**: [`EntityId`] and [`EdgeId`] are the host store's internal references
//! - **Graph primitives**: [`Entity`] (nodes) and [`Edge`] (relationships)
//! - **Kinds**: [`EntityKind`] and [`EntityRef`] address either kind uniformly
//! - **Values**: [`Value`] enum for property values
//! - **Diffs**: [`TransactionDiff`] lists created, deleted and modified elements
//!
//! # Example
//!
//! ```
//! use graphuid_core::{Edge, EdgeId, Entity, EntityId, EntityRef, PropertyContainer, Value};
//!
//! let alice = Entity::new(EntityId::new(1))
//!     .with_label("Person")
//!     .with_property("name", "Alice");
//!
//! let bob = Entity::new(EntityId::new(2)).with_label("Person");
//!
//! let follows = Edge::new(EdgeId::new(1), alice.id, bob.id, "FOLLOWS");
//!
//! assert_eq!(alice.entity_ref(), EntityRef::Node(EntityId::new(1)));
//! assert_eq!(follows.entity_ref(), EntityRef::Relationship(EdgeId::new(1)));
//! assert_eq!(alice.get_property("name"), Some(&Value::String("Alice".into())));
//! ```
//!
//! # Modules
//!
//! - [`types`] - Core data types ([`Entity`], [`Edge`], [`Value`], IDs, diffs)
//! - [`encoding`] - Record serialization and key encoding utilities
//! - [`error`] - Error types ([`CoreError`])
//! - [`transaction`] - Transaction error types ([`TransactionError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod transaction;
pub mod types;

pub use error::CoreError;
pub use transaction::{TransactionError, TransactionResult};
pub use types::{
    Change, Edge, EdgeId, EdgeType, Entity, EntityId, EntityKind, EntityRef, KindDiff, Label,
    PropertyContainer, TransactionDiff, Value,
};
