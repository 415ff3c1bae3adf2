//! Entity kinds and kind-agnostic references.
//!
//! Nodes and relationships live in separate namespaces. [`EntityRef`] names a
//! single element of either kind, and [`PropertyContainer`] lets code that only
//! cares about properties treat [`Entity`] and [`Edge`] uniformly.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Edge, EdgeId, Entity, EntityId, Value};

/// The kind of a graph element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// A node ([`Entity`]).
    Node,
    /// A relationship ([`Edge`]).
    Relationship,
}

impl EntityKind {
    /// Both kinds, nodes first.
    pub const ALL: [Self; 2] = [Self::Node, Self::Relationship];

    /// A lowercase name for log and error output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Relationship => "relationship",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a node or relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityRef {
    /// A node reference.
    Node(EntityId),
    /// A relationship reference.
    Relationship(EdgeId),
}

impl EntityRef {
    /// The kind of the referenced element.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Node(_) => EntityKind::Node,
            Self::Relationship(_) => EntityKind::Relationship,
        }
    }

    /// The raw numeric id, without the kind.
    #[must_use]
    pub const fn raw_id(self) -> u64 {
        match self {
            Self::Node(id) => id.as_u64(),
            Self::Relationship(id) => id.as_u64(),
        }
    }

    /// Rebuild a reference from a kind and a raw id.
    #[must_use]
    pub const fn from_raw(kind: EntityKind, id: u64) -> Self {
        match kind {
            EntityKind::Node => Self::Node(EntityId::new(id)),
            EntityKind::Relationship => Self::Relationship(EdgeId::new(id)),
        }
    }
}

impl From<EntityId> for EntityRef {
    fn from(id: EntityId) -> Self {
        Self::Node(id)
    }
}

impl From<EdgeId> for EntityRef {
    fn from(id: EdgeId) -> Self {
        Self::Relationship(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind(), self.raw_id())
    }
}

/// Shared property access for nodes and relationships.
pub trait PropertyContainer {
    /// The kind this container belongs to.
    const KIND: EntityKind;

    /// The reference of this element.
    fn entity_ref(&self) -> EntityRef;

    /// Read a property.
    fn property(&self, key: &str) -> Option<&Value>;

    /// Write a property.
    fn put_property(&mut self, key: &str, value: Value);

    /// Remove a property, returning the previous value.
    fn take_property(&mut self, key: &str) -> Option<Value>;
}

impl PropertyContainer for Entity {
    const KIND: EntityKind = EntityKind::Node;

    fn entity_ref(&self) -> EntityRef {
        EntityRef::Node(self.id)
    }

    fn property(&self, key: &str) -> Option<&Value> {
        self.get_property(key)
    }

    fn put_property(&mut self, key: &str, value: Value) {
        self.set_property(key, value);
    }

    fn take_property(&mut self, key: &str) -> Option<Value> {
        self.remove_property(key)
    }
}

impl PropertyContainer for Edge {
    const KIND: EntityKind = EntityKind::Relationship;

    fn entity_ref(&self) -> EntityRef {
        EntityRef::Relationship(self.id)
    }

    fn property(&self, key: &str) -> Option<&Value> {
        self.get_property(key)
    }

    fn put_property(&mut self, key: &str, value: Value) {
        self.set_property(key, value);
    }

    fn take_property(&mut self, key: &str) -> Option<Value> {
        self.remove_property(key)
    }
}
