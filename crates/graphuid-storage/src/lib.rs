//! graphuid storage
//!
//! This crate provides the storage engine abstraction and the redb backend
//! that the graphuid host store persists into.
//!
//! # Overview
//!
//! The storage layer provides a transactional key-value interface that backends
//! implement. Logical tables are addressed by name; the redb backend maps them
//! onto key prefixes inside a single physical table.
//!
//! # Core Traits
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - ACID transaction support with read/write operations
//! - [`Cursor`] - Ordered forward iteration over key-value pairs
//!
//! # Error Handling
//!
//! All storage operations return [`StorageResult<T>`], which is an alias for
//! `Result<T, StorageError>`.
//!
//! # Example
//!
//! ```ignore
//! use graphuid_storage::{StorageEngine, Transaction};
//! use graphuid_storage::backends::RedbEngine;
//!
//! let engine = RedbEngine::open("graph.redb")?;
//!
//! let mut tx = engine.begin_write()?;
//! tx.put("metadata", b"schema", b"1")?;
//! tx.commit()?;
//!
//! let tx = engine.begin_read()?;
//! assert_eq!(tx.get("metadata", b"schema")?, Some(b"1".to_vec()));
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Storage engine traits and abstractions
//! - [`backends`] - Concrete storage backend implementations

#![deny(clippy::unwrap_used)]

pub mod backends;
pub mod engine;

pub use engine::{
    Cursor, CursorResult, KeyValue, StorageEngine, StorageError, StorageResult, Transaction,
};
