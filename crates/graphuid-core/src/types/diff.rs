//! Transaction diffs handed to commit hooks.
//!
//! A [`TransactionDiff`] describes what a write transaction is about to make
//! durable: which nodes and relationships it creates, deletes, and modifies.
//! Deleted elements carry their last committed state; modified elements carry
//! both the committed state and the pending one.

use super::{Edge, Entity, EntityKind};

/// Before and after state of a modified element.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    /// State as last committed.
    pub previous: T,
    /// State the transaction is about to commit.
    pub current: T,
}

impl<T> Change<T> {
    /// Create a new change.
    pub const fn new(previous: T, current: T) -> Self {
        Self { previous, current }
    }
}

/// Changes to elements of a single kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindDiff<T> {
    /// Elements that did not exist before the transaction.
    pub created: Vec<T>,
    /// Elements removed by the transaction, in their committed state.
    pub deleted: Vec<T>,
    /// Elements whose labels or properties changed.
    pub modified: Vec<Change<T>>,
}

impl<T> Default for KindDiff<T> {
    fn default() -> Self {
        Self { created: Vec::new(), deleted: Vec::new(), modified: Vec::new() }
    }
}

impl<T> KindDiff<T> {
    /// Returns `true` if nothing of this kind changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }

    /// Total number of changed elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.created.len() + self.deleted.len() + self.modified.len()
    }
}

/// All changes a transaction is about to commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDiff {
    /// Node changes.
    pub nodes: KindDiff<Entity>,
    /// Relationship changes.
    pub relationships: KindDiff<Edge>,
}

impl TransactionDiff {
    /// Create an empty diff.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the transaction changes no graph element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Number of changed elements of the given kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Node => self.nodes.len(),
            EntityKind::Relationship => self.relationships.len(),
        }
    }
}
