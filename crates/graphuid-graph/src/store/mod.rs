//! Node and edge storage operations.
//!
//! # Overview
//!
//! - [`NodeStore`] - Create, read, update, delete nodes and their label index
//! - [`EdgeStore`] - Create, read, update, delete edges and their adjacency index
//! - [`IdGenerator`] - Monotonic ID allocation for entities and edges
//!
//! All operations are generic over [`graphuid_storage::Transaction`], so they
//! run against a raw backend transaction as well as a buffered
//! [`GraphTransaction`](crate::transaction::GraphTransaction).
//!
//! # Tables
//!
//! - `nodes` - Node records keyed by entity ID
//! - `label_index` - `(label, entity ID)` keys for label lookups
//! - `edges` - Edge records keyed by edge ID
//! - `edges_out` / `edges_in` - Adjacency by source and target
//! - `metadata` - Store bookkeeping such as id high-water marks
//! - `index_catalog` - Descriptors of secondary indexes kept by extensions

mod edge;
mod error;
mod id_gen;
mod node;

pub use edge::{EdgeStore, TABLE_EDGES, TABLE_EDGES_IN, TABLE_EDGES_OUT};
pub use error::{storage_error_to_transaction_error, GraphError, GraphResult};
pub use id_gen::{IdGenerator, NEXT_EDGE_ID_KEY, NEXT_ENTITY_ID_KEY};
pub use node::{NodeStore, TABLE_LABELS, TABLE_NODES};

pub(crate) use id_gen::decode_counter;

/// Table name for store metadata.
pub const TABLE_METADATA: &str = "metadata";

/// Table name for the secondary index catalog.
pub const TABLE_INDEX_CATALOG: &str = "index_catalog";
