//! Node records and the label index.
//!
//! A node lives under its [`encode_entity_key`] in [`TABLE_NODES`]; each of
//! its labels adds an empty-valued entry to [`TABLE_LABELS`]. Every write
//! here updates both so a label scan never sees a stale node.

use std::ops::Bound;

use graphuid_core::encoding::keys::{
    decode_entity_key, decode_label_index_entity_id, encode_entity_key, encode_label_index_key,
    encode_label_index_prefix, prefix_end,
};
use graphuid_core::encoding::{Decoder, Encoder};
use graphuid_core::{Entity, EntityId, Label};
use graphuid_storage::{Cursor, Transaction};

use super::error::{GraphError, GraphResult};
use super::IdGenerator;

/// Logical table of node records.
pub const TABLE_NODES: &str = "nodes";

/// Logical table of the label index.
pub const TABLE_LABELS: &str = "label_index";

/// Stateless node operations over any storage [`Transaction`].
///
/// Callers pass either a backend transaction or a buffered
/// [`GraphTransaction`](crate::transaction::GraphTransaction).
///
/// ```ignore
/// let ids = IdGenerator::new();
/// let alice = NodeStore::create(&mut tx, &ids, |id| Entity::new(id).with_label("Person"))?;
/// assert_eq!(NodeStore::find_by_label(&tx, &Label::new("Person"))?, vec![alice.id]);
/// ```
pub struct NodeStore;

impl NodeStore {
    /// Allocate an id, build the node with it and store it.
    pub fn create<T, F>(tx: &mut T, ids: &IdGenerator, build: F) -> GraphResult<Entity>
    where
        T: Transaction,
        F: FnOnce(EntityId) -> Entity,
    {
        let id = ids.next_entity_id();
        let entity = Entity { id, ..build(id) };
        Self::write(tx, &entity, None)?;
        Ok(entity)
    }

    /// Store a node whose id the caller picked.
    ///
    /// # Errors
    ///
    /// [`GraphError::EntityAlreadyExists`] when the id is taken.
    pub fn create_with_id<T: Transaction>(tx: &mut T, entity: &Entity) -> GraphResult<()> {
        if Self::exists(tx, entity.id)? {
            return Err(GraphError::EntityAlreadyExists(entity.id));
        }
        Self::write(tx, entity, None)
    }

    /// Read a node.
    pub fn get<T: Transaction>(tx: &T, id: EntityId) -> GraphResult<Option<Entity>> {
        tx.get(TABLE_NODES, &encode_entity_key(id))?
            .map(|bytes| Entity::decode(&bytes))
            .transpose()
            .map_err(GraphError::from)
    }

    /// Read a node that must exist.
    ///
    /// # Errors
    ///
    /// [`GraphError::EntityNotFound`] when it does not.
    pub fn get_or_error<T: Transaction>(tx: &T, id: EntityId) -> GraphResult<Entity> {
        Self::get(tx, id)?.ok_or(GraphError::EntityNotFound(id))
    }

    /// Whether a node record exists, without decoding it.
    pub fn exists<T: Transaction>(tx: &T, id: EntityId) -> GraphResult<bool> {
        Ok(tx.get(TABLE_NODES, &encode_entity_key(id))?.is_some())
    }

    /// Insert or overwrite a node.
    pub fn put<T: Transaction>(tx: &mut T, entity: &Entity) -> GraphResult<()> {
        let previous = Self::get(tx, entity.id)?;
        Self::write(tx, entity, previous.as_ref())
    }

    /// Overwrite a node that must exist.
    ///
    /// # Errors
    ///
    /// [`GraphError::EntityNotFound`] when it does not.
    pub fn update<T: Transaction>(tx: &mut T, entity: &Entity) -> GraphResult<()> {
        let previous = Self::get_or_error(tx, entity.id)?;
        Self::write(tx, entity, Some(&previous))
    }

    fn write<T: Transaction>(tx: &mut T, entity: &Entity, old: Option<&Entity>) -> GraphResult<()> {
        let dropped = old
            .into_iter()
            .flat_map(|o| &o.labels)
            .filter(|l| !entity.has_label(l.as_str()));
        for label in dropped {
            tx.delete(TABLE_LABELS, &encode_label_index_key(label, entity.id)?)?;
        }
        tx.put(TABLE_NODES, &encode_entity_key(entity.id), &entity.encode()?)?;
        for label in &entity.labels {
            tx.put(TABLE_LABELS, &encode_label_index_key(label, entity.id)?, &[])?;
        }
        Ok(())
    }

    /// Remove a node and its label entries. Relationships touching it stay;
    /// [`GraphTransaction::delete_node_cascade`](crate::GraphTransaction::delete_node_cascade)
    /// removes those too.
    ///
    /// Returns whether there was anything to remove.
    pub fn delete<T: Transaction>(tx: &mut T, id: EntityId) -> GraphResult<bool> {
        let Some(entity) = Self::get(tx, id)? else {
            return Ok(false);
        };
        for label in &entity.labels {
            tx.delete(TABLE_LABELS, &encode_label_index_key(label, id)?)?;
        }
        tx.delete(TABLE_NODES, &encode_entity_key(id))?;
        Ok(true)
    }

    /// Ids of every node carrying `label`, ascending.
    pub fn find_by_label<T: Transaction>(tx: &T, label: &Label) -> GraphResult<Vec<EntityId>> {
        let start = encode_label_index_prefix(label)?;
        let end = prefix_end(&start);
        let mut cursor = tx.range(
            TABLE_LABELS,
            Bound::Included(start.as_slice()),
            end.as_deref().map_or(Bound::Unbounded, Bound::Excluded),
        )?;

        let mut found = Vec::new();
        while let Some((key, _)) = cursor.next()? {
            let id = decode_label_index_entity_id(&key)
                .ok_or_else(|| GraphError::DataCorruption(format!("label index key {key:?}")))?;
            found.push(id);
        }
        Ok(found)
    }

    /// Up to `limit` nodes in id order, strictly after `after`.
    ///
    /// Feeding the last returned id back in pages through every node.
    pub fn scan<T: Transaction>(
        tx: &T,
        after: Option<EntityId>,
        limit: usize,
    ) -> GraphResult<Vec<Entity>> {
        let from = after.map(encode_entity_key);
        let mut cursor = tx.range(
            TABLE_NODES,
            from.as_deref().map_or(Bound::Unbounded, Bound::Excluded),
            Bound::Unbounded,
        )?;
        let page = cursor.take_next(limit)?;
        page.iter().map(|(_, bytes)| Entity::decode(bytes).map_err(GraphError::from)).collect()
    }

    /// Number of stored nodes.
    pub fn count<T: Transaction>(tx: &T) -> GraphResult<usize> {
        let mut cursor = tx.cursor(TABLE_NODES)?;
        let mut total = 0;
        while let Some((key, _)) = cursor.next()? {
            total += usize::from(decode_entity_key(&key).is_some());
        }
        Ok(total)
    }
}
