//! Core storage engine traits.
//!
//! The graph store and the identifier index only ever see these traits, never
//! a backend type. Generic associated types let a backend hand out
//! transactions and cursors that borrow from their parent.

use std::ops::Bound;

use super::StorageError;

/// A key-value pair returned by cursor operations.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Result type for cursor operations that return a key-value pair.
pub type CursorResult = Result<Option<KeyValue>, StorageError>;

/// Source of snapshot-isolated key-value transactions.
///
/// ```ignore
/// use graphuid_storage::{StorageEngine, StorageError, Transaction};
///
/// fn claim<E: StorageEngine>(engine: &E) -> Result<bool, StorageError> {
///     let mut tx = engine.begin_write()?;
///     let fresh = tx.get("metadata", b"sequence:SequenceMetadata")?.is_none();
///     tx.put("metadata", b"sequence:SequenceMetadata", b"1")?;
///     tx.commit()?;
///     Ok(fresh)
/// }
/// ```
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Open a read-only snapshot. Any number may be open at once.
    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Open a write transaction. Backends may serialize these.
    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError>;
}

/// Key-value operations over named logical tables.
///
/// Dropping a write transaction without committing rolls it back.
pub trait Transaction {
    /// The cursor type for iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Read a key. A table that was never written reads as empty.
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Insert or replace a key. Fails with [`StorageError::ReadOnly`] on a
    /// read transaction.
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Remove a key, reporting whether it was present.
    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError>;

    /// A cursor over a whole table, positioned before the first key.
    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError>;

    /// A cursor restricted to `start..end` of a table.
    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError>;

    /// Make every write durable.
    fn commit(self) -> Result<(), StorageError>;

    /// Discard every write.
    fn rollback(self) -> Result<(), StorageError>;

    /// Whether writes are rejected.
    fn is_read_only(&self) -> bool;
}

/// Forward-only iteration in key order.
pub trait Cursor {
    /// Position at the first key greater than or equal to `key` and return it.
    fn seek(&mut self, key: &[u8]) -> CursorResult;

    /// Position at the first key of the cursor's range and return it.
    fn seek_first(&mut self) -> CursorResult;

    /// Advance and return the next key-value pair.
    ///
    /// On an unpositioned cursor this behaves like [`Cursor::seek_first`].
    fn next(&mut self) -> CursorResult;

    /// The entry last returned, if any.
    fn current(&self) -> Option<(&[u8], &[u8])>;

    /// Up to `limit` further entries. Batched scans page with this.
    fn take_next(&mut self, limit: usize) -> Result<Vec<KeyValue>, StorageError> {
        let mut out = Vec::new();
        while out.len() < limit {
            match self.next()? {
                Some(kv) => out.push(kv),
                None => break,
            }
        }
        Ok(out)
    }
}
