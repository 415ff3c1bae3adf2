//! Graph transaction handle.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use graphuid_core::encoding::keys::{encode_edge_key, encode_entity_key};
use graphuid_core::encoding::Decoder;
use graphuid_core::{
    Change, Edge, EdgeId, EdgeType, Entity, EntityId, EntityRef, KindDiff, Label,
    TransactionDiff, TransactionError,
};
use graphuid_storage::backends::RedbTransaction;
use graphuid_storage::{StorageEngine, StorageError, Transaction};
use tracing::{debug, trace};

use super::buffer::WriteBuffer;
use super::cursor::MergeCursor;
use crate::store::{
    storage_error_to_transaction_error, EdgeStore, NodeStore, NEXT_EDGE_ID_KEY,
    NEXT_ENTITY_ID_KEY, TABLE_EDGES, TABLE_METADATA, TABLE_NODES,
};
use crate::GraphStore;

type ReadSet = HashMap<(String, Vec<u8>), Option<Vec<u8>>>;

/// Outcome of a cascading node delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteResult {
    /// Whether the node existed and was deleted.
    pub node_deleted: bool,
    /// Edges deleted along with the node.
    pub edges_deleted: Vec<EdgeId>,
}

/// A transaction against a [`GraphStore`].
///
/// Reads see a snapshot of the store taken when the transaction began, plus
/// the transaction's own writes. Writes are buffered and applied atomically
/// by [`commit`](Self::commit), after the store's commit hooks have seen the
/// resulting [`TransactionDiff`].
///
/// # Conflict detection
///
/// Every committed value read through [`Transaction::get`] is remembered.
/// At commit, each remembered key that the transaction also writes is
/// compared with the latest committed value; any difference fails the commit
/// with [`TransactionError::Conflict`]. Node and edge writes always read the
/// element first, so two transactions updating the same element cannot both
/// commit.
///
/// # Commit and Rollback
///
/// Dropping a transaction without committing rolls it back and releases its
/// entity locks.
///
/// # Example
///
/// ```ignore
/// let mut tx = store.begin_write()?;
/// let alice = tx.create_node()?.with_label("Person").with_property("name", "Alice");
/// tx.put_node(&alice)?;
/// tx.commit()?;
/// ```
pub struct GraphTransaction<'s> {
    store: &'s GraphStore,
    tx_id: u64,
    /// Committed snapshot; `None` once the transaction completed.
    snapshot: Option<RedbTransaction>,
    read_only: bool,
    buffer: WriteBuffer,
    reads: RefCell<ReadSet>,
    /// Committed state of every node this transaction wrote, captured on first write.
    touched_nodes: BTreeMap<EntityId, Option<Entity>>,
    /// Committed state of every edge this transaction wrote, captured on first write.
    touched_edges: BTreeMap<EdgeId, Option<Edge>>,
}

impl<'s> GraphTransaction<'s> {
    pub(crate) fn new(
        store: &'s GraphStore,
        tx_id: u64,
        snapshot: RedbTransaction,
        read_only: bool,
    ) -> Self {
        Self {
            store,
            tx_id,
            snapshot: Some(snapshot),
            read_only,
            buffer: WriteBuffer::new(),
            reads: RefCell::new(HashMap::new()),
            touched_nodes: BTreeMap::new(),
            touched_edges: BTreeMap::new(),
        }
    }

    /// Get the transaction ID.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.tx_id
    }

    /// Check if this is a read-only transaction.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The store this transaction belongs to.
    #[must_use]
    pub const fn store(&self) -> &'s GraphStore {
        self.store
    }

    /// Number of buffered write operations.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.buffer.len()
    }

    fn snapshot(&self) -> Result<&RedbTransaction, StorageError> {
        self.snapshot
            .as_ref()
            .ok_or_else(|| StorageError::Transaction("transaction already completed".to_owned()))
    }

    fn ensure_writable(&self) -> Result<(), TransactionError> {
        if self.snapshot.is_none() {
            return Err(TransactionError::AlreadyCompleted);
        }
        if self.read_only {
            return Err(TransactionError::ReadOnly);
        }
        Ok(())
    }

    /// Read committed state, remembering the value for conflict detection.
    fn committed_get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let slot = (table.to_owned(), key.to_vec());
        if let Some(seen) = self.reads.borrow().get(&slot) {
            return Ok(seen.clone());
        }

        let value = self.snapshot()?.get(table, key)?;
        if !self.read_only {
            self.reads.borrow_mut().insert(slot, value.clone());
        }
        Ok(value)
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Allocate a new node ID and return an empty node carrying it.
    ///
    /// The node is not stored until passed to [`put_node`](Self::put_node).
    pub fn create_node(&mut self) -> Result<Entity, TransactionError> {
        self.ensure_writable()?;
        Ok(Entity::new(self.store.id_generator().next_entity_id()))
    }

    /// Insert or replace a node.
    pub fn put_node(&mut self, entity: &Entity) -> Result<(), TransactionError> {
        self.ensure_writable()?;
        self.touch_node(entity.id)?;
        NodeStore::put(self, entity)?;
        self.store.id_generator().observe_entity_id(entity.id);
        Ok(())
    }

    /// Get a node by ID.
    pub fn get_node(&self, id: EntityId) -> Result<Option<Entity>, TransactionError> {
        Ok(NodeStore::get(self, id)?)
    }

    /// Delete a node that has no connected edges.
    ///
    /// Returns `true` if the node existed and was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::ReferentialIntegrity`] if edges still
    /// reference the node.
    pub fn delete_node(&mut self, id: EntityId) -> Result<bool, TransactionError> {
        self.ensure_writable()?;
        let edges = EdgeStore::get_outgoing_ids(self, id)?.len()
            + EdgeStore::get_incoming_ids(self, id)?.len();
        if edges > 0 {
            return Err(TransactionError::ReferentialIntegrity(format!(
                "cannot delete node {id}: {edges} connected edge(s)"
            )));
        }

        self.touch_node(id)?;
        Ok(NodeStore::delete(self, id)?)
    }

    /// Delete a node together with every edge connected to it.
    pub fn delete_node_cascade(&mut self, id: EntityId) -> Result<DeleteResult, TransactionError> {
        self.ensure_writable()?;

        let mut edge_ids = EdgeStore::get_outgoing_ids(self, id)?;
        for edge_id in EdgeStore::get_incoming_ids(self, id)? {
            // Self-loops appear in both lists
            if !edge_ids.contains(&edge_id) {
                edge_ids.push(edge_id);
            }
        }

        let mut result = DeleteResult::default();
        for edge_id in edge_ids {
            if self.delete_edge(edge_id)? {
                result.edges_deleted.push(edge_id);
            }
        }

        self.touch_node(id)?;
        result.node_deleted = NodeStore::delete(self, id)?;
        Ok(result)
    }

    /// IDs of all nodes carrying `label`, including this transaction's writes.
    pub fn find_nodes_by_label(&self, label: &str) -> Result<Vec<EntityId>, TransactionError> {
        Ok(NodeStore::find_by_label(self, &Label::new(label))?)
    }

    /// Up to `limit` nodes in id order, starting after `after`.
    pub fn scan_nodes(
        &self,
        after: Option<EntityId>,
        limit: usize,
    ) -> Result<Vec<Entity>, TransactionError> {
        Ok(NodeStore::scan(self, after, limit)?)
    }

    /// Number of nodes visible to this transaction.
    pub fn count_nodes(&self) -> Result<usize, TransactionError> {
        Ok(NodeStore::count(self)?)
    }

    fn touch_node(&mut self, id: EntityId) -> Result<(), TransactionError> {
        if self.touched_nodes.contains_key(&id) {
            return Ok(());
        }
        let before = self
            .committed_get(TABLE_NODES, &encode_entity_key(id))
            .map_err(|e| storage_error_to_transaction_error(&e))?
            .map(|bytes| Entity::decode(&bytes))
            .transpose()
            .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        self.touched_nodes.insert(id, before);
        Ok(())
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Allocate a new edge ID and return an edge carrying it.
    ///
    /// The edge is not stored until passed to [`put_edge`](Self::put_edge).
    pub fn create_edge(
        &mut self,
        source: EntityId,
        target: EntityId,
        edge_type: impl Into<EdgeType>,
    ) -> Result<Edge, TransactionError> {
        self.ensure_writable()?;
        Ok(Edge::new(self.store.id_generator().next_edge_id(), source, target, edge_type))
    }

    /// Insert or replace an edge.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::EntityNotFound`] if an endpoint is missing.
    pub fn put_edge(&mut self, edge: &Edge) -> Result<(), TransactionError> {
        self.ensure_writable()?;
        self.touch_edge(edge.id)?;
        EdgeStore::put(self, edge)?;
        self.store.id_generator().observe_edge_id(edge.id);
        Ok(())
    }

    /// Get an edge by ID.
    pub fn get_edge(&self, id: EdgeId) -> Result<Option<Edge>, TransactionError> {
        Ok(EdgeStore::get(self, id)?)
    }

    /// Delete an edge.
    ///
    /// Returns `true` if the edge existed and was deleted.
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<bool, TransactionError> {
        self.ensure_writable()?;
        self.touch_edge(id)?;
        Ok(EdgeStore::delete(self, id)?)
    }

    /// Edges leaving `source`.
    pub fn edges_out(&self, source: EntityId) -> Result<Vec<Edge>, TransactionError> {
        Ok(EdgeStore::get_outgoing(self, source)?)
    }

    /// Edges arriving at `target`.
    pub fn edges_in(&self, target: EntityId) -> Result<Vec<Edge>, TransactionError> {
        Ok(EdgeStore::get_incoming(self, target)?)
    }

    /// Up to `limit` edges in id order, starting after `after`.
    pub fn scan_edges(
        &self,
        after: Option<EdgeId>,
        limit: usize,
    ) -> Result<Vec<Edge>, TransactionError> {
        Ok(EdgeStore::scan(self, after, limit)?)
    }

    /// Number of edges visible to this transaction.
    pub fn count_edges(&self) -> Result<usize, TransactionError> {
        Ok(EdgeStore::count(self)?)
    }

    fn touch_edge(&mut self, id: EdgeId) -> Result<(), TransactionError> {
        if self.touched_edges.contains_key(&id) {
            return Ok(());
        }
        let before = self
            .committed_get(TABLE_EDGES, &encode_edge_key(id))
            .map_err(|e| storage_error_to_transaction_error(&e))?
            .map(|bytes| Edge::decode(&bytes))
            .transpose()
            .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        self.touched_edges.insert(id, before);
        Ok(())
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Read a metadata value.
    pub fn get_metadata(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TransactionError> {
        self.get(TABLE_METADATA, key).map_err(|e| storage_error_to_transaction_error(&e))
    }

    /// Write a metadata value.
    pub fn put_metadata(&mut self, key: &[u8], value: &[u8]) -> Result<(), TransactionError> {
        self.put(TABLE_METADATA, key, value).map_err(|e| storage_error_to_transaction_error(&e))
    }

    /// Delete a metadata value.
    pub fn delete_metadata(&mut self, key: &[u8]) -> Result<bool, TransactionError> {
        self.delete(TABLE_METADATA, key).map_err(|e| storage_error_to_transaction_error(&e))
    }

    // ========================================================================
    // Locks
    // ========================================================================

    /// Take an exclusive lock on `entity` until this transaction ends.
    ///
    /// Unless this transaction already wrote the entity, its recorded read is
    /// replaced by the latest committed state, so a read-modify-write under
    /// the lock starts from current data.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Conflict`] if the lock is not granted
    /// within the store's lock timeout.
    pub fn acquire_write_lock(&mut self, entity: EntityRef) -> Result<(), TransactionError> {
        self.ensure_writable()?;
        let newly_locked =
            self.store.lock_manager().acquire(self.tx_id, entity, self.store.config().lock_timeout)?;
        trace!(tx_id = self.tx_id, %entity, newly_locked, "write lock held");

        let (table, key) = match entity {
            EntityRef::Node(id) => (TABLE_NODES, encode_entity_key(id)),
            EntityRef::Relationship(id) => (TABLE_EDGES, encode_edge_key(id)),
        };
        if !self.buffer.contains(table, &key) {
            let latest = self
                .store
                .engine()
                .begin_read()
                .and_then(|tx| tx.get(table, &key))
                .map_err(|e| storage_error_to_transaction_error(&e))?;
            self.reads.borrow_mut().insert((table.to_owned(), key), latest);
        }
        Ok(())
    }

    // ========================================================================
    // Transaction Lifecycle
    // ========================================================================

    /// The changes this transaction would commit right now.
    pub fn diff(&self) -> Result<TransactionDiff, TransactionError> {
        let mut diff = TransactionDiff::new();
        for (&id, before) in &self.touched_nodes {
            classify(&mut diff.nodes, before.clone(), NodeStore::get(self, id)?);
        }
        for (&id, before) in &self.touched_edges {
            classify(&mut diff.relationships, before.clone(), EdgeStore::get(self, id)?);
        }
        Ok(diff)
    }

    /// Commit the transaction.
    ///
    /// Runs the store's commit hooks, validates the read set against the
    /// latest committed state, and applies all buffered writes atomically.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::HookRejected`] or any other error a hook returns
    /// - [`TransactionError::Conflict`] if a concurrent commit changed data
    ///   this transaction read and wrote
    /// - [`TransactionError::Storage`] if the backend fails
    pub fn commit(self) -> Result<(), TransactionError> {
        self.commit_inner()
    }

    fn commit_inner(mut self) -> Result<(), TransactionError> {
        if self.snapshot.is_none() {
            return Err(TransactionError::AlreadyCompleted);
        }
        if self.read_only {
            self.finish();
            return Ok(());
        }

        let diff = self.diff()?;
        if !diff.is_empty() {
            for hook in self.store.hooks() {
                if let Err(err) = hook.before_commit(&mut self, &diff) {
                    debug!(tx_id = self.tx_id, hook = hook.name(), error = %err, "commit hook rejected transaction");
                    return Err(err);
                }
            }
        }

        if self.buffer.is_empty() {
            self.finish();
            return Ok(());
        }

        let result = self.apply();
        self.finish();
        result
    }

    fn apply(&self) -> Result<(), TransactionError> {
        let _commit_guard = self.store.commit_lock().lock();
        let mut storage =
            self.store.engine().begin_write().map_err(|e| storage_error_to_transaction_error(&e))?;

        if let Err(err) = self.validate(&storage) {
            abort(storage);
            return Err(err);
        }

        if let Err(err) = self.write_all(&mut storage) {
            abort(storage);
            return Err(storage_error_to_transaction_error(&err));
        }

        storage.commit().map_err(|e| storage_error_to_transaction_error(&e))?;
        debug!(tx_id = self.tx_id, ops = self.buffer.len(), "transaction committed");
        Ok(())
    }

    fn validate(&self, storage: &RedbTransaction) -> Result<(), TransactionError> {
        for ((table, key), seen) in self.reads.borrow().iter() {
            if !self.buffer.contains(table, key) {
                continue;
            }
            let committed =
                storage.get(table, key).map_err(|e| storage_error_to_transaction_error(&e))?;
            if committed != *seen {
                debug!(tx_id = self.tx_id, table = %table, "write-write conflict detected");
                return Err(TransactionError::Conflict(format!(
                    "{table} entry was changed by a concurrent transaction"
                )));
            }
        }
        Ok(())
    }

    fn write_all(&self, storage: &mut RedbTransaction) -> Result<(), StorageError> {
        for (table, key, value) in self.buffer.writes() {
            match value {
                Some(value) => storage.put(table, key, value)?,
                None => {
                    storage.delete(table, key)?;
                }
            }
        }

        let ids = self.store.id_generator();
        storage.put(
            TABLE_METADATA,
            NEXT_ENTITY_ID_KEY,
            &ids.current_entity_counter().to_be_bytes(),
        )?;
        storage.put(TABLE_METADATA, NEXT_EDGE_ID_KEY, &ids.current_edge_counter().to_be_bytes())
    }

    /// Roll back the transaction, discarding all changes.
    pub fn rollback(mut self) -> Result<(), TransactionError> {
        if self.snapshot.is_none() {
            return Err(TransactionError::AlreadyCompleted);
        }
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        if self.snapshot.take().is_some() {
            self.store.lock_manager().release_all(self.tx_id);
        }
    }
}

fn classify<T: PartialEq>(kind: &mut KindDiff<T>, before: Option<T>, after: Option<T>) {
    match (before, after) {
        (None, Some(after)) => kind.created.push(after),
        (Some(before), None) => kind.deleted.push(before),
        (Some(before), Some(after)) if before != after => {
            kind.modified.push(Change::new(before, after));
        }
        _ => {}
    }
}

fn abort(storage: RedbTransaction) {
    if let Err(err) = storage.rollback() {
        debug!(error = %err, "failed to abort storage transaction");
    }
}

impl Drop for GraphTransaction<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl Transaction for GraphTransaction<'_> {
    type Cursor<'a>
        = MergeCursor<'a>
    where
        Self: 'a;

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        if let Some(buffered) = self.buffer.get(table, key) {
            return Ok(buffered.map(<[u8]>::to_vec));
        }
        self.committed_get(table, key)
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.snapshot()?;
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.buffer.put(table, key, value);
        Ok(())
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let existed = self.get(table, key)?.is_some();
        self.buffer.delete(table, key);
        Ok(existed)
    }

    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError> {
        self.range(table, Bound::Unbounded, Bound::Unbounded)
    }

    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError> {
        let base = self.snapshot()?.range(table, start, end)?;
        Ok(MergeCursor::new(base, self.buffer.range(table, start, end)))
    }

    fn commit(self) -> Result<(), StorageError> {
        self.commit_inner().map_err(|err| match err {
            TransactionError::Conflict(msg) => StorageError::Conflict(msg),
            TransactionError::ReadOnly => StorageError::ReadOnly,
            other => StorageError::Transaction(other.to_string()),
        })
    }

    fn rollback(self) -> Result<(), StorageError> {
        GraphTransaction::rollback(self).map_err(|e| StorageError::Transaction(e.to_string()))
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
