//! Redb transaction implementation.
//!
//! [`RedbTransaction`] wraps both read-only and read-write Redb transactions
//! behind the [`Transaction`] trait.
//!
//! # Streaming Cursors
//!
//! Cursors never materialize a whole table. They fetch entries in batches
//! (1000 by default, see [`RedbConfig`](super::RedbConfig)) and load the next
//! batch on demand, resuming strictly after the last key they returned.

use std::ops::Bound;

use redb::{ReadTransaction, ReadableTable, WriteTransaction};

use crate::engine::{Cursor, CursorResult, KeyValue, StorageError, Transaction};

use super::tables::{decode_key, encode_key, table_end_key, table_start_key, DATA_TABLE};

/// A transaction for the Redb storage engine.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A read-only transaction.
    Read {
        /// The underlying Redb transaction.
        tx: ReadTransaction,
        /// Cursor batch size.
        batch_size: usize,
    },
    /// A read-write transaction.
    Write {
        /// The underlying Redb transaction.
        tx: WriteTransaction,
        /// Cursor batch size.
        batch_size: usize,
    },
}

impl RedbTransaction {
    /// Create a new read-only transaction.
    pub const fn new_read(tx: ReadTransaction, batch_size: usize) -> Self {
        Self::Read { tx, batch_size }
    }

    /// Create a new read-write transaction.
    pub const fn new_write(tx: WriteTransaction, batch_size: usize) -> Self {
        Self::Write { tx, batch_size }
    }

    const fn batch_size(&self) -> usize {
        match self {
            Self::Read { batch_size, .. } | Self::Write { batch_size, .. } => *batch_size,
        }
    }

    /// Fetch up to `limit` entries of `table` inside the logical bounds.
    fn fetch(
        &self,
        table: &str,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
        limit: usize,
    ) -> Result<Vec<KeyValue>, StorageError> {
        let start = match lower {
            Bound::Included(k) => Bound::Included(encode_key(table, k)),
            Bound::Excluded(k) => Bound::Excluded(encode_key(table, k)),
            Bound::Unbounded => Bound::Included(table_start_key(table)),
        };
        let end = match upper {
            Bound::Included(k) => Bound::Included(encode_key(table, k)),
            Bound::Excluded(k) => Bound::Excluded(encode_key(table, k)),
            Bound::Unbounded => Bound::Excluded(table_end_key(table)),
        };

        match self {
            Self::Read { tx, .. } => match tx.open_table(DATA_TABLE) {
                Ok(t) => read_range(&t, &start, &end, limit),
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(Vec::new()),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write { tx, .. } => match tx.open_table(DATA_TABLE) {
                Ok(t) => read_range(&t, &start, &end, limit),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
        }
    }
}

fn as_slice_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn read_range<T>(
    table: &T,
    start: &Bound<Vec<u8>>,
    end: &Bound<Vec<u8>>,
    limit: usize,
) -> Result<Vec<KeyValue>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    // Inverted bounds select nothing.
    if range_is_empty(start, end) {
        return Ok(Vec::new());
    }

    let range = table
        .range::<&[u8]>((as_slice_bound(start), as_slice_bound(end)))
        .map_err(|e| StorageError::Internal(e.to_string()))?;

    let mut entries = Vec::with_capacity(limit.min(1024));
    for result in range {
        if entries.len() >= limit {
            break;
        }
        let (k, v) = result.map_err(|e| StorageError::Internal(e.to_string()))?;
        if let Some((_, key)) = decode_key(k.value()) {
            entries.push((key.to_vec(), v.value().to_vec()));
        }
    }
    Ok(entries)
}

fn range_is_empty(start: &Bound<Vec<u8>>, end: &Bound<Vec<u8>>) -> bool {
    match (start, end) {
        (Bound::Included(s), Bound::Included(e)) => s > e,
        (Bound::Included(s) | Bound::Excluded(s), Bound::Excluded(e))
        | (Bound::Excluded(s), Bound::Included(e)) => s >= e,
        _ => false,
    }
}

impl Transaction for RedbTransaction {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let encoded_key = encode_key(table, key);

        match self {
            Self::Read { tx, .. } => match tx.open_table(DATA_TABLE) {
                Ok(t) => t
                    .get(encoded_key.as_slice())
                    .map(|v| v.map(|v| v.value().to_vec()))
                    .map_err(|e| StorageError::Internal(e.to_string())),
                // No data table yet means no data
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write { tx, .. } => {
                let t =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                t.get(encoded_key.as_slice())
                    .map(|v| v.map(|v| v.value().to_vec()))
                    .map_err(|e| StorageError::Internal(e.to_string()))
            }
        }
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        match self {
            Self::Read { .. } => Err(StorageError::ReadOnly),
            Self::Write { tx, .. } => {
                let encoded_key = encode_key(table, key);
                let mut t =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                t.insert(encoded_key.as_slice(), value)
                    .map_err(|e| StorageError::Internal(e.to_string()))?;
                Ok(())
            }
        }
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError> {
        match self {
            Self::Read { .. } => Err(StorageError::ReadOnly),
            Self::Write { tx, .. } => {
                let encoded_key = encode_key(table, key);
                let mut t =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                let removed = t
                    .remove(encoded_key.as_slice())
                    .map_err(|e| StorageError::Internal(e.to_string()))?;
                Ok(removed.is_some())
            }
        }
    }

    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(RedbCursor::new(self, table, Bound::Unbounded, Bound::Unbounded))
    }

    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(RedbCursor::new(self, table, start.map(<[u8]>::to_vec), end.map(<[u8]>::to_vec)))
    }

    fn commit(self) -> Result<(), StorageError> {
        match self {
            Self::Read { .. } => Ok(()),
            Self::Write { tx, .. } => {
                tx.commit().map_err(|e| StorageError::Transaction(e.to_string()))
            }
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Read { .. } => Ok(()),
            Self::Write { tx, .. } => {
                tx.abort().map_err(|e| StorageError::Transaction(e.to_string()))
            }
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

/// A streaming forward cursor over one logical table.
///
/// At most one batch of entries is held in memory at a time.
pub struct RedbCursor<'a> {
    tx: &'a RedbTransaction,
    table: String,
    start: Bound<Vec<u8>>,
    end: Bound<Vec<u8>>,
    batch: Vec<KeyValue>,
    /// Position in `batch`; `None` until the cursor is first positioned.
    position: Option<usize>,
    /// Whether entries may remain after the current batch.
    has_more: bool,
}

impl<'a> RedbCursor<'a> {
    fn new(tx: &'a RedbTransaction, table: &str, start: Bound<Vec<u8>>, end: Bound<Vec<u8>>) -> Self {
        Self {
            tx,
            table: table.to_string(),
            start,
            end,
            batch: Vec::new(),
            position: None,
            has_more: false,
        }
    }

    fn load(&mut self, lower: &Bound<Vec<u8>>) -> Result<(), StorageError> {
        let limit = self.tx.batch_size();
        self.batch =
            self.tx.fetch(&self.table, as_slice_bound(lower), as_slice_bound(&self.end), limit)?;
        self.has_more = self.batch.len() >= limit;
        self.position = Some(0);
        Ok(())
    }

    fn current_owned(&self) -> Option<KeyValue> {
        self.position.and_then(|pos| self.batch.get(pos)).cloned()
    }
}

impl Cursor for RedbCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        let lower = match &self.start {
            Bound::Included(s) if s.as_slice() > key => Bound::Included(s.clone()),
            Bound::Excluded(s) if s.as_slice() >= key => Bound::Excluded(s.clone()),
            _ => Bound::Included(key.to_vec()),
        };
        self.load(&lower)?;
        Ok(self.current_owned())
    }

    fn seek_first(&mut self) -> CursorResult {
        let lower = self.start.clone();
        self.load(&lower)?;
        Ok(self.current_owned())
    }

    fn next(&mut self) -> CursorResult {
        let Some(pos) = self.position else {
            return self.seek_first();
        };
        if pos >= self.batch.len() {
            return Ok(None);
        }

        let next = pos + 1;
        if next < self.batch.len() {
            self.position = Some(next);
            return Ok(self.current_owned());
        }

        if self.has_more {
            if let Some((last, _)) = self.batch.last() {
                let lower = Bound::Excluded(last.clone());
                self.load(&lower)?;
                return Ok(self.current_owned());
            }
        }

        self.position = Some(self.batch.len());
        Ok(None)
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        self.position
            .and_then(|pos| self.batch.get(pos))
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
