//! Write buffering for graph transactions.
//!
//! A [`WriteBuffer`] keeps the latest pending state of every key a transaction
//! touched, per table and in key order. Reads consult it first so the
//! transaction sees its own writes; commit replays it into one storage write
//! transaction. Nothing touches storage before that.

use std::collections::BTreeMap;
use std::ops::Bound;

/// A buffered entry as seen by range scans: `None` marks a delete.
pub type BufferedEntry = (Vec<u8>, Option<Vec<u8>>);

/// Pending writes of one transaction.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    tables: BTreeMap<String, BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
    ops: usize,
}

impl WriteBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, table: &str, key: &[u8], value: Option<&[u8]>) {
        self.ops += 1;
        let slot = value.map(<[u8]>::to_vec);
        match self.tables.get_mut(table) {
            Some(keys) => {
                keys.insert(key.to_vec(), slot);
            }
            None => {
                self.tables.insert(table.to_owned(), BTreeMap::from([(key.to_vec(), slot)]));
            }
        }
    }

    /// Buffer a put.
    pub fn put(&mut self, table: &str, key: &[u8], value: &[u8]) {
        self.record(table, key, Some(value));
    }

    /// Buffer a delete.
    pub fn delete(&mut self, table: &str, key: &[u8]) {
        self.record(table, key, None);
    }

    /// The pending state of a key: `None` if untouched, `Some(None)` if
    /// deleted.
    #[must_use]
    pub fn get(&self, table: &str, key: &[u8]) -> Option<Option<&[u8]>> {
        self.tables.get(table)?.get(key).map(Option::as_deref)
    }

    /// Whether the key was put or deleted.
    #[must_use]
    pub fn contains(&self, table: &str, key: &[u8]) -> bool {
        self.get(table, key).is_some()
    }

    /// Pending entries of `table` inside the bounds, in key order.
    #[must_use]
    pub fn range(&self, table: &str, start: Bound<&[u8]>, end: Bound<&[u8]>) -> Vec<BufferedEntry> {
        let Some(keys) = self.tables.get(table) else {
            return Vec::new();
        };
        if is_inverted(start, end) {
            return Vec::new();
        }
        keys.range::<[u8], _>((start, end)).map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Every pending write as `(table, key, value)`; a `None` value is a delete.
    pub fn writes(&self) -> impl Iterator<Item = (&str, &[u8], Option<&[u8]>)> {
        self.tables.iter().flat_map(|(table, keys)| {
            keys.iter().map(move |(k, v)| (table.as_str(), k.as_slice(), v.as_deref()))
        })
    }

    /// Number of put and delete calls so far, including overwritten ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops == 0
    }
}

/// Bounds that select nothing; `BTreeMap::range` panics on some of them.
fn is_inverted(start: Bound<&[u8]>, end: Bound<&[u8]>) -> bool {
    match (start, end) {
        (Bound::Included(s), Bound::Included(e)) => s > e,
        (Bound::Included(s) | Bound::Excluded(s), Bound::Excluded(e))
        | (Bound::Excluded(s), Bound::Included(e)) => s >= e,
        _ => false,
    }
}
