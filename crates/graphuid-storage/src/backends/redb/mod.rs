//! Redb storage backend.
//!
//! Redb is a pure-Rust embedded database with ACID transactions. All logical
//! tables share one physical redb table; see [`tables`] for the key layout.
//!
//! # Example
//!
//! ```ignore
//! use graphuid_storage::backends::RedbEngine;
//! use graphuid_storage::{StorageEngine, Transaction};
//!
//! let engine = RedbEngine::open("graph.redb")?;
//!
//! let mut tx = engine.begin_write()?;
//! tx.put("nodes", b"\x01\0\0\0\0\0\0\0\x01", b"...")?;
//! tx.commit()?;
//! ```
//!
//! # In-Memory Databases
//!
//! For tests, an in-memory database that doesn't persist:
//!
//! ```ignore
//! let engine = RedbEngine::in_memory()?;
//! ```
//!
//! # Configuration
//!
//! ```ignore
//! use graphuid_storage::backends::redb::{RedbConfig, RedbEngine};
//!
//! let config = RedbConfig::new().cache_size(64 * 1024 * 1024);
//! let engine = RedbEngine::open_with_config("graph.redb", config)?;
//! ```

mod engine;
pub mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::{RedbCursor, RedbTransaction};
