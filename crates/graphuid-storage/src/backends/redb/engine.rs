//! Redb storage engine implementation.

use std::path::Path;

use redb::{Builder, Database, DatabaseError};
use tracing::debug;

use crate::engine::{StorageEngine, StorageError};

use super::transaction::RedbTransaction;

/// Default number of entries a cursor loads per round trip.
pub const DEFAULT_CURSOR_BATCH_SIZE: usize = 1000;

/// Tuning for [`RedbEngine`].
#[derive(Debug, Clone, Copy)]
pub struct RedbConfig {
    /// Page cache size in bytes; `None` keeps redb's default.
    pub cache_size: Option<usize>,
    /// Entries a cursor loads per round trip. Zero is treated as one.
    pub cursor_batch_size: usize,
}

impl Default for RedbConfig {
    fn default() -> Self {
        Self { cache_size: None, cursor_batch_size: DEFAULT_CURSOR_BATCH_SIZE }
    }
}

impl RedbConfig {
    /// Defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page cache size.
    #[must_use]
    pub const fn cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = Some(bytes);
        self
    }

    /// Set the cursor batch size.
    #[must_use]
    pub const fn cursor_batch_size(mut self, entries: usize) -> Self {
        self.cursor_batch_size = entries;
        self
    }

    fn builder(&self) -> Builder {
        let mut builder = Database::builder();
        if let Some(bytes) = self.cache_size {
            builder.set_cache_size(bytes);
        }
        builder
    }
}

/// A [`StorageEngine`] over a single redb database, file-backed or in memory.
pub struct RedbEngine {
    db: Database,
    cursor_batch_size: usize,
}

impl RedbEngine {
    /// Open or create the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// [`Self::open`] with explicit tuning.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: RedbConfig,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = config.builder().create(path).map_err(open_error)?;
        debug!(path = %path.display(), "opened redb database");
        Ok(Self::with_database(db, config))
    }

    /// A database that lives only as long as the engine.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::in_memory_with_config(RedbConfig::default())
    }

    /// [`Self::in_memory`] with explicit tuning.
    pub fn in_memory_with_config(config: RedbConfig) -> Result<Self, StorageError> {
        let db = config
            .builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(open_error)?;
        Ok(Self::with_database(db, config))
    }

    fn with_database(db: Database, config: RedbConfig) -> Self {
        Self { db, cursor_batch_size: config.cursor_batch_size.max(1) }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn open_error(err: DatabaseError) -> StorageError {
    StorageError::Open(err.to_string())
}

impl StorageEngine for RedbEngine {
    type Transaction<'a> = RedbTransaction;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        self.db
            .begin_read()
            .map(|tx| RedbTransaction::new_read(tx, self.cursor_batch_size))
            .map_err(|e| StorageError::Transaction(e.to_string()))
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        self.db
            .begin_write()
            .map(|tx| RedbTransaction::new_write(tx, self.cursor_batch_size))
            .map_err(|e| StorageError::Transaction(e.to_string()))
    }
}
