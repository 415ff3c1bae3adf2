//! Identifier assignment in the commit pipeline.
//!
//! [`AssignmentCoordinator`] is a [`CommitHook`]. For every committing write
//! transaction it walks the diff, kind by kind:
//!
//! 1. Deleted elements release their index entries.
//! 2. Modified elements are checked against the immutability rule; changed
//!    identifiers are re-validated and re-indexed.
//! 3. Created elements that qualify keep a pre-assigned identifier (after a
//!    uniqueness check) or receive a generated one.
//!
//! Every identifier write and index write goes through the committing
//! transaction, so they become durable together with the caller's changes or
//! not at all. Any failure rejects the whole transaction.

use std::sync::Arc;

use graphuid_core::{
    Edge, EdgeId, Entity, EntityId, EntityKind, EntityRef, KindDiff, PropertyContainer,
    TransactionDiff, TransactionError, Value,
};
use graphuid_graph::{CommitHook, GraphStore, GraphTransaction};
use tracing::{debug, info, trace};

use crate::config::{Classified, IdentifierConfig};
use crate::enforcer::ConsistencyEnforcer;
use crate::error::{IdentifierChange, IdentifierError, IdentifierResult};
use crate::generator::IdentifierGenerator;
use crate::identifier::Identifier;
use crate::index::IdentifierIndex;

/// Element kinds the coordinator tracks.
trait Tracked: PropertyContainer + Classified + Sized {
    /// Whether the configuration wants this element to carry an identifier.
    fn qualifies(&self, coordinator: &AssignmentCoordinator) -> bool;

    /// The element's state as seen by `tx`.
    fn reload(&self, tx: &GraphTransaction<'_>) -> Result<Option<Self>, TransactionError>;

    /// Write the element back through `tx`.
    fn store(&self, tx: &mut GraphTransaction<'_>) -> Result<(), TransactionError>;

    /// Up to `limit` elements in id order after the raw id `after`.
    fn scan(
        tx: &GraphTransaction<'_>,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<Self>, TransactionError>;
}

impl Tracked for Entity {
    fn qualifies(&self, coordinator: &AssignmentCoordinator) -> bool {
        !coordinator.excluded_labels.iter().any(|label| self.has_label(label))
            && coordinator.config.node_inclusion.includes(self)
    }

    fn reload(&self, tx: &GraphTransaction<'_>) -> Result<Option<Self>, TransactionError> {
        tx.get_node(self.id)
    }

    fn store(&self, tx: &mut GraphTransaction<'_>) -> Result<(), TransactionError> {
        tx.put_node(self)
    }

    fn scan(
        tx: &GraphTransaction<'_>,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<Self>, TransactionError> {
        tx.scan_nodes(after.map(EntityId::new), limit)
    }
}

impl Tracked for Edge {
    fn qualifies(&self, coordinator: &AssignmentCoordinator) -> bool {
        coordinator.config.relationship_inclusion.includes(self)
    }

    fn reload(&self, tx: &GraphTransaction<'_>) -> Result<Option<Self>, TransactionError> {
        tx.get_edge(self.id)
    }

    fn store(&self, tx: &mut GraphTransaction<'_>) -> Result<(), TransactionError> {
        tx.put_edge(self)
    }

    fn scan(
        tx: &GraphTransaction<'_>,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<Self>, TransactionError> {
        tx.scan_edges(after.map(EdgeId::new), limit)
    }
}

/// Counts from one kind's initialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindReport {
    /// Elements visited.
    pub scanned: usize,
    /// Elements that received a generated identifier.
    pub assigned: usize,
    /// Elements whose existing identifier was added to the index.
    pub indexed: usize,
    /// Committed batches.
    pub batches: usize,
}

/// Result of [`AssignmentCoordinator::initialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitializationReport {
    /// Node counts.
    pub nodes: KindReport,
    /// Relationship counts.
    pub relationships: KindReport,
}

/// Assigns, validates and indexes identifiers as transactions commit.
pub struct AssignmentCoordinator {
    config: IdentifierConfig,
    generator: Arc<dyn IdentifierGenerator>,
    node_index: IdentifierIndex,
    relationship_index: IdentifierIndex,
    excluded_labels: Vec<String>,
}

impl AssignmentCoordinator {
    /// Create a coordinator.
    ///
    /// Nodes carrying any of `excluded_labels` never receive identifiers,
    /// whatever the inclusion policy says.
    #[must_use]
    pub fn new(
        config: IdentifierConfig,
        generator: Arc<dyn IdentifierGenerator>,
        excluded_labels: Vec<String>,
    ) -> Self {
        let owned = |kind, name: &str| {
            IdentifierIndex::new(kind, name)
                .owned_by(config.identifier_property.as_str(), config.module_id.as_str())
        };
        let node_index = owned(EntityKind::Node, &config.node_index_name);
        let relationship_index = owned(EntityKind::Relationship, &config.relationship_index_name);
        Self { config, generator, node_index, relationship_index, excluded_labels }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// The index for a kind.
    #[must_use]
    pub const fn index(&self, kind: EntityKind) -> &IdentifierIndex {
        match kind {
            EntityKind::Node => &self.node_index,
            EntityKind::Relationship => &self.relationship_index,
        }
    }

    /// Apply identifier rules to a committing transaction.
    ///
    /// # Errors
    ///
    /// - [`IdentifierError::DuplicateIdentifier`] if an identifier is taken
    /// - [`IdentifierError::ImmutableIdentifier`] if an assigned identifier
    ///   was removed or changed under an immutable configuration
    /// - [`IdentifierError::InvalidIdentifier`] for values of other types
    /// - generator and transaction errors
    pub fn process(
        &self,
        tx: &mut GraphTransaction<'_>,
        diff: &TransactionDiff,
    ) -> IdentifierResult<()> {
        self.process_kind(tx, &diff.nodes)?;
        self.process_kind(tx, &diff.relationships)
    }

    fn process_kind<T: Tracked>(
        &self,
        tx: &mut GraphTransaction<'_>,
        diff: &KindDiff<T>,
    ) -> IdentifierResult<()> {
        let index = self.index(T::KIND);

        for element in &diff.deleted {
            if let Some(identifier) = index.remove(tx, element.entity_ref())? {
                trace!(entity = %element.entity_ref(), %identifier, "released identifier");
            }
        }

        for change in &diff.modified {
            let entity = change.current.entity_ref();
            let previous = self.lenient_identifier(&change.previous);
            let current = self.identifier_of(&change.current)?;

            match (previous, current) {
                (Some(_), None) => {
                    self.ensure_mutable(entity, IdentifierChange::Removed)?;
                    index.remove(tx, entity)?;
                    if change.current.qualifies(self) {
                        self.assign(tx, &change.current)?;
                    }
                }
                (Some(before), Some(after)) if before != after => {
                    self.ensure_mutable(entity, IdentifierChange::Modified)?;
                    ConsistencyEnforcer::validate(&*tx, index, &after, entity)?;
                    index.add(tx, &after, entity)?;
                    debug!(%entity, from = %before, to = %after, "identifier changed");
                }
                (Some(_), Some(_)) => {}
                (None, None) => {
                    if change.current.qualifies(self) {
                        self.assign(tx, &change.current)?;
                    }
                }
                (None, Some(after)) => {
                    if change.current.qualifies(self) {
                        ConsistencyEnforcer::validate(&*tx, index, &after, entity)?;
                        index.add(tx, &after, entity)?;
                    }
                }
            }
        }

        for element in &diff.created {
            if !element.qualifies(self) {
                continue;
            }
            match self.identifier_of(element)? {
                Some(identifier) => {
                    let entity = element.entity_ref();
                    ConsistencyEnforcer::validate(&*tx, index, &identifier, entity)?;
                    index.add(tx, &identifier, entity)?;
                    trace!(%entity, %identifier, "indexed pre-assigned identifier");
                }
                None => {
                    self.assign(tx, element)?;
                }
            }
        }
        Ok(())
    }

    /// Generate an identifier for `element`, store it and index it.
    ///
    /// Returns `false` if the element no longer exists in `tx`.
    fn assign<T: Tracked>(
        &self,
        tx: &mut GraphTransaction<'_>,
        element: &T,
    ) -> IdentifierResult<bool> {
        let Some(mut current) = element.reload(tx)? else {
            return Ok(false);
        };
        let entity = current.entity_ref();

        let mut identifier = self.generator.generate(tx.store())?;
        if self.config.strip_hyphens {
            identifier = identifier.strip_hyphens();
        }

        let index = self.index(T::KIND);
        ConsistencyEnforcer::validate(&*tx, index, &identifier, entity)?;
        current.put_property(&self.config.identifier_property, identifier.to_value());
        current.store(tx)?;
        index.add(tx, &identifier, entity)?;

        debug!(%entity, %identifier, generator = self.generator.name(), "assigned identifier");
        Ok(true)
    }

    fn ensure_mutable(&self, entity: EntityRef, change: IdentifierChange) -> IdentifierResult<()> {
        if self.config.immutable {
            return Err(IdentifierError::ImmutableIdentifier {
                kind: entity.kind(),
                entity,
                property: self.config.identifier_property.clone(),
                change,
            });
        }
        Ok(())
    }

    /// The identifier an element carries. Null counts as absent.
    fn identifier_of<T: Tracked>(&self, element: &T) -> IdentifierResult<Option<Identifier>> {
        match element.property(&self.config.identifier_property) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Identifier::from_value(value).map(Some).ok_or_else(|| {
                IdentifierError::InvalidIdentifier {
                    kind: T::KIND,
                    entity: element.entity_ref(),
                    type_name: value.type_name(),
                }
            }),
        }
    }

    /// Committed states are trusted; a value that cannot be an identifier
    /// counts as absent.
    fn lenient_identifier<T: Tracked>(&self, element: &T) -> Option<Identifier> {
        element.property(&self.config.identifier_property).and_then(Identifier::from_value)
    }

    /// Assign or index identifiers for every element already in the store.
    ///
    /// Elements are processed in batches of
    /// [`initialization_batch_size`](IdentifierConfig::initialization_batch_size),
    /// each in its own committed transaction. Elements that already carry a
    /// valid identifier keep it. Running the pass again finds nothing to do.
    ///
    /// # Errors
    ///
    /// Fails on the first batch that cannot commit; batches committed before
    /// it stay committed.
    pub fn initialize(&self, store: &GraphStore) -> IdentifierResult<InitializationReport> {
        let report = InitializationReport {
            nodes: self.initialize_kind::<Entity>(store)?,
            relationships: self.initialize_kind::<Edge>(store)?,
        };
        info!(
            module = %self.config.module_id,
            nodes_assigned = report.nodes.assigned,
            nodes_indexed = report.nodes.indexed,
            relationships_assigned = report.relationships.assigned,
            relationships_indexed = report.relationships.indexed,
            "identifier initialization complete"
        );
        Ok(report)
    }

    fn initialize_kind<T: Tracked>(&self, store: &GraphStore) -> IdentifierResult<KindReport> {
        let index = self.index(T::KIND);
        let mut report = KindReport::default();
        let mut after = None;

        loop {
            let mut tx = store.begin_write()?;
            let batch = T::scan(&tx, after, self.config.initialization_batch_size)?;
            let Some(last) = batch.last() else {
                tx.rollback()?;
                break;
            };
            after = Some(last.entity_ref().raw_id());
            report.scanned += batch.len();

            for element in &batch {
                if !element.qualifies(self) {
                    continue;
                }
                let entity = element.entity_ref();
                match self.identifier_of(element)? {
                    Some(identifier) => {
                        if index.identifier_of(&tx, entity)?.as_ref() != Some(&identifier) {
                            ConsistencyEnforcer::validate(&tx, index, &identifier, entity)?;
                            index.add(&mut tx, &identifier, entity)?;
                            report.indexed += 1;
                        }
                    }
                    None => {
                        if self.assign(&mut tx, element)? {
                            report.assigned += 1;
                        }
                    }
                }
            }

            tx.commit()?;
            report.batches += 1;
            debug!(kind = %T::KIND, batch = report.batches, scanned = report.scanned, "initialized batch");
        }
        Ok(report)
    }
}

impl CommitHook for AssignmentCoordinator {
    fn name(&self) -> &str {
        &self.config.module_id
    }

    fn before_commit(
        &self,
        tx: &mut GraphTransaction<'_>,
        diff: &TransactionDiff,
    ) -> Result<(), TransactionError> {
        match self.process(tx, diff) {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!(module = %self.config.module_id, tx_id = tx.id(), error = %e, "transaction rejected");
                Err(e.into_transaction_error())
            }
        }
    }
}

impl std::fmt::Debug for AssignmentCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentCoordinator")
            .field("config", &self.config)
            .field("generator", &self.generator.name())
            .field("excluded_labels", &self.excluded_labels)
            .finish_non_exhaustive()
    }
}
