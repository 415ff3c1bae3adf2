//! Order-preserving storage keys for the graph tables.
//!
//! Every key starts with a one-byte tag followed by big-endian integers, so
//! byte order equals numeric order and prefix scans stay inside one tag:
//!
//! | tag    | layout                                   |
//! |--------|------------------------------------------|
//! | `0x01` | node: `[tag][entity_id]`                  |
//! | `0x02` | relationship: `[tag][edge_id]`            |
//! | `0x03` | outgoing: `[tag][source_id][edge_id]`     |
//! | `0x04` | incoming: `[tag][target_id][edge_id]`     |
//! | `0x05` | label: `[tag][len: u16][label][entity_id]` |
//!
//! The label length prefix keeps `Person` from matching `Personnel`.

use crate::error::CoreError;
use crate::types::{EdgeId, EntityId, Label};

/// Tag of node records.
pub const PREFIX_ENTITY: u8 = 0x01;
/// Tag of relationship records.
pub const PREFIX_EDGE: u8 = 0x02;
/// Tag of the outgoing adjacency index.
pub const PREFIX_EDGE_BY_SOURCE: u8 = 0x03;
/// Tag of the incoming adjacency index.
pub const PREFIX_EDGE_BY_TARGET: u8 = 0x04;
/// Tag of the label index.
pub const PREFIX_LABEL_INDEX: u8 = 0x05;

const ID_LEN: usize = 8;

fn tagged(tag: u8, ids: &[u64]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + ids.len() * ID_LEN);
    key.push(tag);
    for id in ids {
        key.extend_from_slice(&id.to_be_bytes());
    }
    key
}

fn trailing_id(key: &[u8]) -> Option<u64> {
    let start = key.len().checked_sub(ID_LEN)?;
    key[start..].try_into().ok().map(u64::from_be_bytes)
}

/// Key of a node record.
#[must_use]
pub fn encode_entity_key(id: EntityId) -> Vec<u8> {
    tagged(PREFIX_ENTITY, &[id.as_u64()])
}

/// Key of a relationship record.
#[must_use]
pub fn encode_edge_key(id: EdgeId) -> Vec<u8> {
    tagged(PREFIX_EDGE, &[id.as_u64()])
}

/// Outgoing adjacency entry of `edge_id` under `source`.
#[must_use]
pub fn encode_edge_by_source_key(source: EntityId, edge_id: EdgeId) -> Vec<u8> {
    tagged(PREFIX_EDGE_BY_SOURCE, &[source.as_u64(), edge_id.as_u64()])
}

/// Scan prefix of every relationship leaving `source`.
#[must_use]
pub fn encode_edge_by_source_prefix(source: EntityId) -> Vec<u8> {
    tagged(PREFIX_EDGE_BY_SOURCE, &[source.as_u64()])
}

/// Incoming adjacency entry of `edge_id` under `target`.
#[must_use]
pub fn encode_edge_by_target_key(target: EntityId, edge_id: EdgeId) -> Vec<u8> {
    tagged(PREFIX_EDGE_BY_TARGET, &[target.as_u64(), edge_id.as_u64()])
}

/// Scan prefix of every relationship arriving at `target`.
#[must_use]
pub fn encode_edge_by_target_prefix(target: EntityId) -> Vec<u8> {
    tagged(PREFIX_EDGE_BY_TARGET, &[target.as_u64()])
}

/// Label index entry of `entity_id` under `label`.
///
/// # Errors
///
/// [`CoreError::LabelTooLong`] past `u16::MAX` bytes.
pub fn encode_label_index_key(label: &Label, entity_id: EntityId) -> Result<Vec<u8>, CoreError> {
    let mut key = encode_label_index_prefix(label)?;
    key.extend_from_slice(&entity_id.as_u64().to_be_bytes());
    Ok(key)
}

/// Scan prefix of every node carrying `label`.
///
/// # Errors
///
/// [`CoreError::LabelTooLong`] past `u16::MAX` bytes.
pub fn encode_label_index_prefix(label: &Label) -> Result<Vec<u8>, CoreError> {
    let name = label.as_str().as_bytes();
    let len = u16::try_from(name.len()).map_err(|_| CoreError::LabelTooLong(name.len()))?;
    let mut key = Vec::with_capacity(3 + name.len() + ID_LEN);
    key.push(PREFIX_LABEL_INDEX);
    key.extend_from_slice(&len.to_be_bytes());
    key.extend_from_slice(name);
    Ok(key)
}

/// The node id of a node record key.
#[must_use]
pub fn decode_entity_key(key: &[u8]) -> Option<EntityId> {
    (key.len() == 1 + ID_LEN && key[0] == PREFIX_ENTITY)
        .then(|| trailing_id(key))
        .flatten()
        .map(EntityId::new)
}

/// The relationship id of a relationship record key.
#[must_use]
pub fn decode_edge_key(key: &[u8]) -> Option<EdgeId> {
    (key.len() == 1 + ID_LEN && key[0] == PREFIX_EDGE)
        .then(|| trailing_id(key))
        .flatten()
        .map(EdgeId::new)
}

/// The node id closing a label index key.
#[must_use]
pub fn decode_label_index_entity_id(key: &[u8]) -> Option<EntityId> {
    (key.len() >= 3 + ID_LEN && key[0] == PREFIX_LABEL_INDEX)
        .then(|| trailing_id(key))
        .flatten()
        .map(EntityId::new)
}

/// The relationship id closing an adjacency key of either direction.
#[must_use]
pub fn decode_adjacency_edge_id(key: &[u8]) -> Option<EdgeId> {
    let adjacency = matches!(key.first(), Some(&(PREFIX_EDGE_BY_SOURCE | PREFIX_EDGE_BY_TARGET)));
    (adjacency && key.len() == 1 + 2 * ID_LEN).then(|| trailing_id(key)).flatten().map(EdgeId::new)
}

/// Smallest key greater than every key starting with `prefix`, or `None`
/// when no such key exists (all `0xFF`).
#[must_use]
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let keep = prefix.iter().rposition(|&b| b != 0xFF)?;
    let mut end = prefix[..=keep].to_vec();
    end[keep] += 1;
    Some(end)
}
