//! Graph transactions.
//!
//! # Overview
//!
//! - [`GraphTransaction`] - Snapshot reads, buffered writes, validated commits
//! - [`CommitHook`] - Extension point run before a write transaction commits
//! - [`LockManager`] - Exclusive, transaction-scoped entity locks
//! - [`WriteBuffer`] - Pending writes of one transaction
//! - [`MergeCursor`] - Iteration over committed state overlaid with pending writes
//!
//! # Isolation
//!
//! A transaction reads the snapshot that was current when it began, plus its
//! own writes. Commits are optimistic: the store applies one commit at a time
//! and rejects a commit with [`TransactionError::Conflict`](graphuid_core::TransactionError::Conflict)
//! when data it read and rewrote has changed since. Callers that need to
//! serialize on a single element take an entity lock first.

mod buffer;
mod cursor;
mod handle;
mod hook;
mod lock;

pub use buffer::{BufferedEntry, WriteBuffer};
pub use cursor::MergeCursor;
pub use handle::{DeleteResult, GraphTransaction};
pub use hook::CommitHook;
pub use lock::LockManager;
