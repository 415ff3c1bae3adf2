//! Core data types for graphuid.
//!
//! This module defines the fundamental types that represent entities, edges,
//! their properties, and the transaction diffs observed by commit hooks.

#[macro_use]
mod macros;

mod diff;
mod edge;
mod entity;
mod id;
mod kind;
mod value;

pub use diff::{Change, KindDiff, TransactionDiff};
pub use edge::{Edge, EdgeType};
pub use entity::{Entity, Label};
pub use id::{EdgeId, EntityId};
pub use kind::{EntityKind, EntityRef, PropertyContainer};
pub use value::Value;
