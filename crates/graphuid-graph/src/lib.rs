//! graphuid graph
//!
//! This crate provides the embedded property graph that hosts the identifier
//! engine: node and edge storage with label and adjacency indexes,
//! transactions with snapshot reads and validated commits, entity locks, and
//! commit hooks.
//!
//! # Overview
//!
//! - [`GraphStore`] - Opens a store and begins transactions
//! - [`GraphTransaction`] - Reads and writes nodes, edges, and metadata
//! - [`CommitHook`] - Sees the [`TransactionDiff`](graphuid_core::TransactionDiff)
//!   of every write transaction and may extend or reject it
//!
//! # Example
//!
//! ```ignore
//! use graphuid_graph::GraphStore;
//!
//! let store = GraphStore::in_memory()?;
//!
//! let mut tx = store.begin_write()?;
//! let alice = tx.create_node()?.with_label("Person").with_property("name", "Alice");
//! let bob = tx.create_node()?.with_label("Person").with_property("name", "Bob");
//! tx.put_node(&alice)?;
//! tx.put_node(&bob)?;
//! let knows = tx.create_edge(alice.id, bob.id, "KNOWS")?;
//! tx.put_edge(&knows)?;
//! tx.commit()?;
//! ```
//!
//! # Modules
//!
//! - [`store`] - Node and edge storage operations
//! - [`transaction`] - Transactions, commit hooks, and entity locks

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

mod graph;
pub mod store;
pub mod transaction;

pub use graph::{GraphStore, GraphStoreConfig};
pub use transaction::{CommitHook, DeleteResult, GraphTransaction};
