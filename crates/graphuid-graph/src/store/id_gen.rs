//! Internal id allocation for nodes and edges.
//!
//! Ids are handed out from in-memory atomic counters. The store persists the
//! high-water marks in its metadata table with every commit and resumes from
//! them on open, so ids are never reused, even when the transaction that
//! allocated them rolled back.

use std::sync::atomic::{AtomicU64, Ordering};

use graphuid_core::{EdgeId, EntityId};

/// Metadata key holding the next entity id to assign.
pub const NEXT_ENTITY_ID_KEY: &[u8] = b"next_entity_id";

/// Metadata key holding the next edge id to assign.
pub const NEXT_EDGE_ID_KEY: &[u8] = b"next_edge_id";

/// One monotonic counter. Zero is never handed out.
#[derive(Debug)]
struct Counter(AtomicU64);

impl Counter {
    fn starting_at(next: u64) -> Self {
        Self(AtomicU64::new(next.max(1)))
    }

    fn take(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    fn skip_past(&self, used: u64) {
        self.0.fetch_max(used.saturating_add(1), Ordering::SeqCst);
    }

    fn peek(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Allocator for node and relationship ids.
///
/// ```
/// use graphuid_graph::store::IdGenerator;
///
/// let ids = IdGenerator::new();
/// assert!(ids.next_entity_id() < ids.next_entity_id());
/// ```
#[derive(Debug)]
pub struct IdGenerator {
    entities: Counter,
    edges: Counter,
}

impl IdGenerator {
    /// Both counters at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_start(1, 1)
    }

    /// Resume from persisted high-water marks.
    #[must_use]
    pub fn with_start(entity_start: u64, edge_start: u64) -> Self {
        Self { entities: Counter::starting_at(entity_start), edges: Counter::starting_at(edge_start) }
    }

    /// Allocate a node id.
    pub fn next_entity_id(&self) -> EntityId {
        EntityId::new(self.entities.take())
    }

    /// Allocate a relationship id.
    pub fn next_edge_id(&self) -> EdgeId {
        EdgeId::new(self.edges.take())
    }

    /// Keep future node ids above one a caller chose itself.
    pub fn observe_entity_id(&self, id: EntityId) {
        self.entities.skip_past(id.as_u64());
    }

    /// Keep future relationship ids above one a caller chose itself.
    pub fn observe_edge_id(&self, id: EdgeId) {
        self.edges.skip_past(id.as_u64());
    }

    /// The node id the next allocation returns.
    #[must_use]
    pub fn current_entity_counter(&self) -> u64 {
        self.entities.peek()
    }

    /// The relationship id the next allocation returns.
    #[must_use]
    pub fn current_edge_counter(&self) -> u64 {
        self.edges.peek()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a persisted high-water mark.
pub(crate) fn decode_counter(bytes: &[u8]) -> Option<u64> {
    bytes.try_into().ok().map(u64::from_be_bytes)
}
