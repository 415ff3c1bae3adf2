//! Lookups by identifier.

use graphuid_core::{Edge, EdgeId, Entity, EntityId, EntityKind, EntityRef, TransactionError};
use graphuid_graph::GraphStore;
use tracing::debug;

use crate::error::{IdentifierError, IdentifierResult};
use crate::identifier::Identifier;
use crate::index::IdentifierIndex;

/// Resolves identifiers to elements.
///
/// Every call reads through its own read transaction, so results reflect the
/// latest committed state. Nothing is cached between calls.
#[derive(Clone, Copy)]
pub struct IdentifierReader<'s> {
    store: &'s GraphStore,
    node_index: &'s IdentifierIndex,
    relationship_index: &'s IdentifierIndex,
}

impl<'s> IdentifierReader<'s> {
    /// Create a reader over the given indexes.
    #[must_use]
    pub const fn new(
        store: &'s GraphStore,
        node_index: &'s IdentifierIndex,
        relationship_index: &'s IdentifierIndex,
    ) -> Self {
        Self { store, node_index, relationship_index }
    }

    const fn index(&self, kind: EntityKind) -> &'s IdentifierIndex {
        match kind {
            EntityKind::Node => self.node_index,
            EntityKind::Relationship => self.relationship_index,
        }
    }

    /// The element of `kind` holding `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::NotFound`] if no element holds it.
    pub fn find_entity_id(
        &self,
        kind: EntityKind,
        identifier: &Identifier,
    ) -> IdentifierResult<EntityRef> {
        let tx = self.store.begin_read()?;
        let result = self.index(kind).get(&tx, identifier);
        if let Err(e) = &result {
            if e.is_not_found() {
                debug!(%kind, %identifier, "identifier lookup missed");
            }
        }
        result
    }

    /// The node holding `identifier`.
    pub fn find_node_id(&self, identifier: &Identifier) -> IdentifierResult<EntityId> {
        match self.find_entity_id(EntityKind::Node, identifier)? {
            EntityRef::Node(id) => Ok(id),
            EntityRef::Relationship(_) => Err(wrong_kind(EntityKind::Node)),
        }
    }

    /// The relationship holding `identifier`.
    pub fn find_relationship_id(&self, identifier: &Identifier) -> IdentifierResult<EdgeId> {
        match self.find_entity_id(EntityKind::Relationship, identifier)? {
            EntityRef::Relationship(id) => Ok(id),
            EntityRef::Node(_) => Err(wrong_kind(EntityKind::Relationship)),
        }
    }

    /// Resolve many identifiers in one read transaction.
    ///
    /// The result is in input order.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::NotFound`] for the first identifier nobody
    /// holds.
    pub fn find_many(
        &self,
        kind: EntityKind,
        identifiers: &[Identifier],
    ) -> IdentifierResult<Vec<EntityRef>> {
        let tx = self.store.begin_read()?;
        let index = self.index(kind);
        identifiers.iter().map(|identifier| index.get(&tx, identifier)).collect()
    }

    /// The node holding `identifier`, loaded.
    pub fn find_node(&self, identifier: &Identifier) -> IdentifierResult<Entity> {
        let tx = self.store.begin_read()?;
        let id = match self.node_index.get(&tx, identifier)? {
            EntityRef::Node(id) => id,
            EntityRef::Relationship(_) => return Err(wrong_kind(EntityKind::Node)),
        };
        tx.get_node(id)?.ok_or_else(|| TransactionError::EntityNotFound(id.to_string()).into())
    }

    /// The relationship holding `identifier`, loaded.
    pub fn find_relationship(&self, identifier: &Identifier) -> IdentifierResult<Edge> {
        let tx = self.store.begin_read()?;
        let id = match self.relationship_index.get(&tx, identifier)? {
            EntityRef::Relationship(id) => id,
            EntityRef::Node(_) => return Err(wrong_kind(EntityKind::Relationship)),
        };
        tx.get_edge(id)?.ok_or_else(|| TransactionError::EdgeNotFound(id.to_string()).into())
    }

    /// The identifier indexed for `entity`, if any.
    pub fn identifier_of(&self, entity: EntityRef) -> IdentifierResult<Option<Identifier>> {
        let tx = self.store.begin_read()?;
        self.index(entity.kind()).identifier_of(&tx, entity)
    }
}

fn wrong_kind(kind: EntityKind) -> IdentifierError {
    IdentifierError::Config(format!("{kind} index holds an entry of the other kind"))
}
