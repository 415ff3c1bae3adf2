//! Cursor merging buffered writes over a committed snapshot.

use graphuid_storage::backends::RedbCursor;
use graphuid_storage::{Cursor, CursorResult, KeyValue};

use super::buffer::BufferedEntry;

/// A forward cursor over a transaction's view of one table.
///
/// Entries come from the committed snapshot, overridden by the transaction's
/// buffered puts and hidden by its buffered deletes.
pub struct MergeCursor<'a> {
    base: RedbCursor<'a>,
    /// Buffered entries of the scanned range, sorted by key.
    overlay: Vec<BufferedEntry>,
    overlay_pos: usize,
    /// The next snapshot entry not yet returned.
    base_next: Option<KeyValue>,
    current: Option<KeyValue>,
    positioned: bool,
}

impl<'a> MergeCursor<'a> {
    pub(crate) fn new(base: RedbCursor<'a>, overlay: Vec<BufferedEntry>) -> Self {
        Self {
            base,
            overlay,
            overlay_pos: 0,
            base_next: None,
            current: None,
            positioned: false,
        }
    }

    fn position(&mut self, base_first: Option<KeyValue>, overlay_start: usize) -> CursorResult {
        self.base_next = base_first;
        self.overlay_pos = overlay_start;
        self.positioned = true;
        self.advance()
    }

    fn advance(&mut self) -> CursorResult {
        loop {
            let overlay = self.overlay.get(self.overlay_pos).cloned().filter(|(key, _)| {
                !matches!(&self.base_next, Some((base_key, _)) if key > base_key)
            });

            if let Some((key, value)) = overlay {
                self.overlay_pos += 1;
                if matches!(&self.base_next, Some((base_key, _)) if *base_key == key) {
                    self.base_next = self.base.next()?;
                }
                if let Some(value) = value {
                    self.current = Some((key, value));
                    return Ok(self.current.clone());
                }
                // Deleted in this transaction
                continue;
            }

            self.current = self.base_next.take();
            if self.current.is_some() {
                self.base_next = self.base.next()?;
            }
            return Ok(self.current.clone());
        }
    }
}

impl Cursor for MergeCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        let base_first = self.base.seek(key)?;
        let overlay_start = self.overlay.partition_point(|(k, _)| k.as_slice() < key);
        self.position(base_first, overlay_start)
    }

    fn seek_first(&mut self) -> CursorResult {
        let base_first = self.base.seek_first()?;
        self.position(base_first, 0)
    }

    fn next(&mut self) -> CursorResult {
        if !self.positioned {
            return self.seek_first();
        }
        self.advance()
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        self.current.as_ref().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
