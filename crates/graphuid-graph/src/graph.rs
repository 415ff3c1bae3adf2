//! The graph store and its configuration.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use graphuid_storage::backends::{RedbConfig, RedbEngine};
use graphuid_storage::{StorageEngine, Transaction};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::store::{
    decode_counter, storage_error_to_transaction_error, IdGenerator, NEXT_EDGE_ID_KEY,
    NEXT_ENTITY_ID_KEY, TABLE_METADATA,
};
use crate::transaction::{CommitHook, GraphTransaction, LockManager};
use graphuid_core::TransactionError;

/// Default time a transaction waits for an entity lock.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`GraphStore`].
#[derive(Debug, Clone, Copy)]
pub struct GraphStoreConfig {
    /// How long [`GraphTransaction::acquire_write_lock`] waits before failing
    /// with a conflict.
    pub lock_timeout: Duration,

    /// Storage backend options.
    pub redb: RedbConfig,
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self { lock_timeout: DEFAULT_LOCK_TIMEOUT, redb: RedbConfig::default() }
    }
}

impl GraphStoreConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entity lock timeout.
    #[must_use]
    pub const fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Set the storage backend options.
    #[must_use]
    pub const fn redb(mut self, redb: RedbConfig) -> Self {
        self.redb = redb;
        self
    }
}

/// An embedded, transactional property graph.
///
/// The store hands out [`GraphTransaction`]s with snapshot reads and
/// optimistic, validated commits. Extensions observe and extend write
/// transactions through [`CommitHook`]s.
///
/// # Thread Safety
///
/// `GraphStore` is `Send + Sync` and can be shared across threads with
/// `Arc<GraphStore>`. Each transaction is used from a single thread.
///
/// # Example
///
/// ```ignore
/// use graphuid_graph::GraphStore;
///
/// let store = GraphStore::in_memory()?;
///
/// let mut tx = store.begin_write()?;
/// let node = tx.create_node()?.with_label("Person");
/// tx.put_node(&node)?;
/// tx.commit()?;
///
/// let tx = store.begin_read()?;
/// assert!(tx.get_node(node.id)?.is_some());
/// ```
pub struct GraphStore {
    engine: RedbEngine,
    config: GraphStoreConfig,
    id_gen: IdGenerator,
    next_tx_id: AtomicU64,
    /// Serializes the validate-and-apply phase of commits.
    commit_lock: Mutex<()>,
    locks: LockManager,
    hooks: RwLock<Vec<Arc<dyn CommitHook>>>,
}

impl GraphStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransactionError> {
        Self::open_with_config(path, GraphStoreConfig::default())
    }

    /// Open or create a store at the given path with custom configuration.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: GraphStoreConfig,
    ) -> Result<Self, TransactionError> {
        let engine = RedbEngine::open_with_config(path, config.redb)
            .map_err(|e| storage_error_to_transaction_error(&e))?;
        Self::from_engine(engine, config)
    }

    /// Create an in-memory store.
    pub fn in_memory() -> Result<Self, TransactionError> {
        Self::in_memory_with_config(GraphStoreConfig::default())
    }

    /// Create an in-memory store with custom configuration.
    pub fn in_memory_with_config(config: GraphStoreConfig) -> Result<Self, TransactionError> {
        let engine = RedbEngine::in_memory_with_config(config.redb)
            .map_err(|e| storage_error_to_transaction_error(&e))?;
        Self::from_engine(engine, config)
    }

    /// Wrap an opened engine, resuming id allocation from its metadata.
    pub fn from_engine(engine: RedbEngine, config: GraphStoreConfig) -> Result<Self, TransactionError> {
        let (entity_start, edge_start) = {
            let tx = engine.begin_read().map_err(|e| storage_error_to_transaction_error(&e))?;
            let read = |key: &[u8]| -> Result<u64, TransactionError> {
                let bytes =
                    tx.get(TABLE_METADATA, key).map_err(|e| storage_error_to_transaction_error(&e))?;
                match bytes {
                    None => Ok(1),
                    Some(bytes) => decode_counter(&bytes).ok_or_else(|| {
                        TransactionError::Serialization("corrupt id counter".to_owned())
                    }),
                }
            };
            (read(NEXT_ENTITY_ID_KEY)?, read(NEXT_EDGE_ID_KEY)?)
        };
        debug!(entity_start, edge_start, "resumed id allocation");

        Ok(Self {
            engine,
            config,
            id_gen: IdGenerator::with_start(entity_start, edge_start),
            next_tx_id: AtomicU64::new(1),
            commit_lock: Mutex::new(()),
            locks: LockManager::new(),
            hooks: RwLock::new(Vec::new()),
        })
    }

    /// Get the store configuration.
    #[must_use]
    pub const fn config(&self) -> &GraphStoreConfig {
        &self.config
    }

    /// Get the underlying storage engine.
    #[must_use]
    pub const fn engine(&self) -> &RedbEngine {
        &self.engine
    }

    /// Register a commit hook. Hooks run in registration order.
    pub fn register_hook(&self, hook: Arc<dyn CommitHook>) {
        info!(hook = hook.name(), "registered commit hook");
        self.hooks.write().push(hook);
    }

    /// Number of registered commit hooks.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.read().len()
    }

    /// Begin a read-only transaction.
    pub fn begin_read(&self) -> Result<GraphTransaction<'_>, TransactionError> {
        self.begin(true)
    }

    /// Begin a read-write transaction.
    ///
    /// Write transactions run concurrently; conflicts are detected at commit.
    pub fn begin_write(&self) -> Result<GraphTransaction<'_>, TransactionError> {
        self.begin(false)
    }

    fn begin(&self, read_only: bool) -> Result<GraphTransaction<'_>, TransactionError> {
        let snapshot =
            self.engine.begin_read().map_err(|e| storage_error_to_transaction_error(&e))?;
        let tx_id = self.next_tx_id.fetch_add(1, Ordering::Relaxed);
        Ok(GraphTransaction::new(self, tx_id, snapshot, read_only))
    }

    pub(crate) const fn id_generator(&self) -> &IdGenerator {
        &self.id_gen
    }

    pub(crate) const fn lock_manager(&self) -> &LockManager {
        &self.locks
    }

    pub(crate) const fn commit_lock(&self) -> &Mutex<()> {
        &self.commit_lock
    }

    /// A snapshot of the registered hooks, so hooks may register others.
    pub(crate) fn hooks(&self) -> Vec<Arc<dyn CommitHook>> {
        self.hooks.read().clone()
    }
}
