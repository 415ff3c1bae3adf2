//! Nodes.
//!
//! ```
//! use graphuid_core::types::{Entity, EntityId};
//!
//! let person = Entity::new(EntityId::new(1))
//!     .with_label("Person")
//!     .with_property("name", "Alice");
//!
//! assert!(person.has_label("Person"));
//! assert_eq!(person.get_property("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{EntityId, Value};

name_type! {
    /// A node label. Labels drive node inclusion policies and the label index.
    Label
}

/// A node in the host graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Store-allocated id.
    pub id: EntityId,
    /// Labels, without duplicates.
    pub labels: Vec<Label>,
    /// Property map, including any identifier properties.
    pub properties: HashMap<String, Value>,
}

impl Entity {
    /// An unlabelled node with no properties.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self { id, labels: Vec::new(), properties: HashMap::new() }
    }

    /// Builder form of [`Self::add_label`].
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.add_label(label);
        self
    }

    /// Whether the node carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.as_str() == label)
    }

    /// Attach a label; `false` if it was already there.
    pub fn add_label(&mut self, label: impl Into<Label>) -> bool {
        let label = label.into();
        let fresh = !self.has_label(label.as_str());
        if fresh {
            self.labels.push(label);
        }
        fresh
    }

    /// Detach a label; `false` if it was not there.
    pub fn remove_label(&mut self, label: &str) -> bool {
        match self.labels.iter().position(|l| l.as_str() == label) {
            Some(pos) => {
                self.labels.remove(pos);
                true
            }
            None => false,
        }
    }
}

property_methods!(Entity);
