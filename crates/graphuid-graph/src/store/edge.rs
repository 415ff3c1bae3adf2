//! Relationship records and the adjacency indexes.
//!
//! A relationship is stored once in [`TABLE_EDGES`] and referenced twice:
//! under its start node in [`TABLE_EDGES_OUT`] and under its end node in
//! [`TABLE_EDGES_IN`]. Neighbourhood lookups scan one endpoint's prefix
//! instead of the whole relationship table.

use std::ops::Bound;

use graphuid_core::encoding::keys::{
    decode_adjacency_edge_id, decode_edge_key, encode_edge_by_source_key,
    encode_edge_by_source_prefix, encode_edge_by_target_key, encode_edge_by_target_prefix,
    encode_edge_key, prefix_end,
};
use graphuid_core::encoding::{Decoder, Encoder};
use graphuid_core::{Edge, EdgeId, EdgeType, EntityId};
use graphuid_storage::{Cursor, Transaction};

use super::error::{GraphError, GraphResult};
use super::node::NodeStore;
use super::IdGenerator;

/// Logical table of relationship records.
pub const TABLE_EDGES: &str = "edges";

/// Logical table of the outgoing adjacency index.
pub const TABLE_EDGES_OUT: &str = "edges_out";

/// Logical table of the incoming adjacency index.
pub const TABLE_EDGES_IN: &str = "edges_in";

/// Both adjacency entries of a relationship, outgoing first.
fn adjacency(edge: &Edge) -> [(&'static str, Vec<u8>); 2] {
    [
        (TABLE_EDGES_OUT, encode_edge_by_source_key(edge.source, edge.id)),
        (TABLE_EDGES_IN, encode_edge_by_target_key(edge.target, edge.id)),
    ]
}

/// Stateless relationship operations over any storage [`Transaction`].
pub struct EdgeStore;

impl EdgeStore {
    /// Allocate an id and store a relationship between two existing nodes.
    ///
    /// `build` may add properties; the id and endpoints it returns are reset.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidEntityReference`] for a missing endpoint.
    pub fn create<T, F>(
        tx: &mut T,
        ids: &IdGenerator,
        source: EntityId,
        target: EntityId,
        edge_type: impl Into<EdgeType>,
        build: F,
    ) -> GraphResult<Edge>
    where
        T: Transaction,
        F: FnOnce(Edge) -> Edge,
    {
        Self::check_endpoints(tx, source, target)?;
        let id = ids.next_edge_id();
        let edge = Edge { id, source, target, ..build(Edge::new(id, source, target, edge_type)) };
        Self::write(tx, &edge, None)?;
        Ok(edge)
    }

    fn check_endpoints<T: Transaction>(
        tx: &T,
        source: EntityId,
        target: EntityId,
    ) -> GraphResult<()> {
        for node in [source, target] {
            if !NodeStore::exists(tx, node)? {
                return Err(GraphError::InvalidEntityReference(node));
            }
        }
        Ok(())
    }

    /// Read a relationship.
    pub fn get<T: Transaction>(tx: &T, id: EdgeId) -> GraphResult<Option<Edge>> {
        tx.get(TABLE_EDGES, &encode_edge_key(id))?
            .map(|bytes| Edge::decode(&bytes))
            .transpose()
            .map_err(GraphError::from)
    }

    /// Read a relationship that must exist.
    ///
    /// # Errors
    ///
    /// [`GraphError::EdgeNotFound`] when it does not.
    pub fn get_or_error<T: Transaction>(tx: &T, id: EdgeId) -> GraphResult<Edge> {
        Self::get(tx, id)?.ok_or(GraphError::EdgeNotFound(id))
    }

    /// Insert or overwrite a relationship. Endpoints are checked only when
    /// they are new or changed.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidEntityReference`] for a missing endpoint.
    pub fn put<T: Transaction>(tx: &mut T, edge: &Edge) -> GraphResult<()> {
        let old = Self::get(tx, edge.id)?;
        let same_ends =
            old.as_ref().is_some_and(|o| (o.source, o.target) == (edge.source, edge.target));
        if !same_ends {
            Self::check_endpoints(tx, edge.source, edge.target)?;
        }
        Self::write(tx, edge, old.as_ref())
    }

    fn write<T: Transaction>(tx: &mut T, edge: &Edge, old: Option<&Edge>) -> GraphResult<()> {
        let fresh = adjacency(edge);
        if let Some(old) = old {
            for (stale, current) in adjacency(old).into_iter().zip(&fresh) {
                if stale.1 != current.1 {
                    tx.delete(stale.0, &stale.1)?;
                }
            }
        }
        tx.put(TABLE_EDGES, &encode_edge_key(edge.id), &edge.encode()?)?;
        for (table, key) in &fresh {
            tx.put(table, key, &[])?;
        }
        Ok(())
    }

    /// Remove a relationship and both adjacency entries.
    ///
    /// Returns whether there was anything to remove.
    pub fn delete<T: Transaction>(tx: &mut T, id: EdgeId) -> GraphResult<bool> {
        let Some(edge) = Self::get(tx, id)? else {
            return Ok(false);
        };
        for (table, key) in adjacency(&edge) {
            tx.delete(table, &key)?;
        }
        tx.delete(TABLE_EDGES, &encode_edge_key(id))?;
        Ok(true)
    }

    /// Ids of relationships starting at `source`.
    pub fn get_outgoing_ids<T: Transaction>(tx: &T, source: EntityId) -> GraphResult<Vec<EdgeId>> {
        Self::adjacent_ids(tx, TABLE_EDGES_OUT, &encode_edge_by_source_prefix(source))
    }

    /// Ids of relationships ending at `target`.
    pub fn get_incoming_ids<T: Transaction>(tx: &T, target: EntityId) -> GraphResult<Vec<EdgeId>> {
        Self::adjacent_ids(tx, TABLE_EDGES_IN, &encode_edge_by_target_prefix(target))
    }

    /// Relationships starting at `source`.
    pub fn get_outgoing<T: Transaction>(tx: &T, source: EntityId) -> GraphResult<Vec<Edge>> {
        Self::get_edges_by_ids(tx, &Self::get_outgoing_ids(tx, source)?)
    }

    /// Relationships ending at `target`.
    pub fn get_incoming<T: Transaction>(tx: &T, target: EntityId) -> GraphResult<Vec<Edge>> {
        Self::get_edges_by_ids(tx, &Self::get_incoming_ids(tx, target)?)
    }

    fn adjacent_ids<T: Transaction>(
        tx: &T,
        table: &str,
        prefix: &[u8],
    ) -> GraphResult<Vec<EdgeId>> {
        let end = prefix_end(prefix);
        let mut cursor = tx.range(
            table,
            Bound::Included(prefix),
            end.as_deref().map_or(Bound::Unbounded, Bound::Excluded),
        )?;

        let mut found = Vec::new();
        while let Some((key, _)) = cursor.next()? {
            let id = decode_adjacency_edge_id(&key)
                .ok_or_else(|| GraphError::DataCorruption(format!("{table} key {key:?}")))?;
            found.push(id);
        }
        Ok(found)
    }

    fn get_edges_by_ids<T: Transaction>(tx: &T, ids: &[EdgeId]) -> GraphResult<Vec<Edge>> {
        ids.iter()
            .map(|&id| {
                Self::get(tx, id)?.ok_or_else(|| {
                    GraphError::DataCorruption(format!("adjacency entry for missing edge {id}"))
                })
            })
            .collect()
    }

    /// Up to `limit` relationships in id order, strictly after `after`.
    pub fn scan<T: Transaction>(
        tx: &T,
        after: Option<EdgeId>,
        limit: usize,
    ) -> GraphResult<Vec<Edge>> {
        let from = after.map(encode_edge_key);
        let mut cursor = tx.range(
            TABLE_EDGES,
            from.as_deref().map_or(Bound::Unbounded, Bound::Excluded),
            Bound::Unbounded,
        )?;
        let page = cursor.take_next(limit)?;
        page.iter().map(|(_, bytes)| Edge::decode(bytes).map_err(GraphError::from)).collect()
    }

    /// Number of stored relationships.
    pub fn count<T: Transaction>(tx: &T) -> GraphResult<usize> {
        let mut cursor = tx.cursor(TABLE_EDGES)?;
        let mut total = 0;
        while let Some((key, _)) = cursor.next()? {
            total += usize::from(decode_edge_key(&key).is_some());
        }
        Ok(total)
    }
}
