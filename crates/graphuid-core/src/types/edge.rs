//! Relationships.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{EdgeId, EntityId, Value};

name_type! {
    /// A relationship type such as `FOLLOWS`. Relationship inclusion policies
    /// match on it.
    EdgeType
}

/// A directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Store-allocated id.
    pub id: EdgeId,
    /// Start node.
    pub source: EntityId,
    /// End node.
    pub target: EntityId,
    /// Relationship type.
    pub edge_type: EdgeType,
    /// Property map, including any identifier properties.
    pub properties: HashMap<String, Value>,
}

impl Edge {
    /// A relationship with no properties.
    #[must_use]
    pub fn new(
        id: EdgeId,
        source: EntityId,
        target: EntityId,
        edge_type: impl Into<EdgeType>,
    ) -> Self {
        Self { id, source, target, edge_type: edge_type.into(), properties: HashMap::new() }
    }
}

property_methods!(Edge);
