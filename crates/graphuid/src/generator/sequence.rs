//! Durable sequence generator.
//!
//! The counter lives in the graph as the single node carrying the configured
//! marker label. Each call runs its own write transaction: find the counter
//! (creating it on first use), take an exclusive lock on it, read, increment,
//! write and commit. Concurrent callers serialize on the lock; a commit that
//! still conflicts is retried from scratch up to a bounded number of attempts.
//!
//! Two callers racing to create the counter both read the same claim key in
//! the store metadata before writing it, so the second committer fails
//! validation and retries, finding the counter the first one created.

use std::fmt;
use std::sync::Arc;

use graphuid_core::{EntityKind, EntityRef, TransactionError, Value};
use graphuid_graph::GraphStore;
use tracing::{debug, error, warn};

use super::IdentifierGenerator;
use crate::error::{IdentifierError, IdentifierResult};
use crate::identifier::Identifier;

/// Default marker label of the counter node.
pub const DEFAULT_SEQUENCE_LABEL: &str = "SequenceMetadata";
/// Default counter property.
pub const DEFAULT_SEQUENCE_PROPERTY: &str = "sequence";
/// Default number of attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Computes the next counter value from the current one.
pub type IncrementFn = Arc<dyn Fn(i64) -> i64 + Send + Sync>;

/// Configuration of a [`SequenceGenerator`].
#[derive(Clone)]
pub struct SequenceConfig {
    /// Marker label of the counter node.
    pub label: String,
    /// Property holding the counter value.
    pub property: String,
    /// Value a newly created counter starts at.
    pub initial: i64,
    /// Attempts per call before failing with
    /// [`IdentifierError::GenerationRetryExhausted`].
    pub max_attempts: u32,
    /// Next-value function, `+1` by default.
    pub increment: IncrementFn,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_SEQUENCE_LABEL.to_owned(),
            property: DEFAULT_SEQUENCE_PROPERTY.to_owned(),
            initial: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            increment: Arc::new(|value: i64| value.saturating_add(1)),
        }
    }
}

impl SequenceConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the counter marker label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the counter property.
    #[must_use]
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    /// Set the start value of a new counter.
    #[must_use]
    pub const fn initial(mut self, initial: i64) -> Self {
        self.initial = initial;
        self
    }

    /// Set the attempt budget.
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Replace the increment function.
    #[must_use]
    pub fn increment(mut self, increment: impl Fn(i64) -> i64 + Send + Sync + 'static) -> Self {
        self.increment = Arc::new(increment);
        self
    }

    fn claim_key(&self) -> Vec<u8> {
        format!("sequence:{}", self.label).into_bytes()
    }
}

impl fmt::Debug for SequenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceConfig")
            .field("label", &self.label)
            .field("property", &self.property)
            .field("initial", &self.initial)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

/// Generates integers from a lock-serialized counter node.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    config: SequenceConfig,
}

impl SequenceGenerator {
    /// Create a generator.
    #[must_use]
    pub const fn new(config: SequenceConfig) -> Self {
        Self { config }
    }

    /// The generator's configuration.
    #[must_use]
    pub const fn config(&self) -> &SequenceConfig {
        &self.config
    }

    fn try_generate(&self, store: &GraphStore) -> IdentifierResult<i64> {
        let mut tx = store.begin_write()?;

        let counters = tx.find_nodes_by_label(&self.config.label)?;
        let counter_id = match counters.as_slice() {
            [] => {
                let claim = self.config.claim_key();
                // Recorded read: a concurrent creator fails validation on this key
                let stale_claim = tx.get_metadata(&claim)?;
                if stale_claim.is_some() {
                    warn!(label = %self.config.label, "sequence counter was deleted, recreating it");
                }
                let counter = tx
                    .create_node()?
                    .with_label(self.config.label.as_str())
                    .with_property(self.config.property.as_str(), self.config.initial);
                tx.put_node(&counter)?;
                tx.put_metadata(&claim, &counter.id.as_u64().to_be_bytes())?;
                debug!(label = %self.config.label, counter = %counter.id, "created sequence counter");
                counter.id
            }
            [id] => *id,
            _ => {
                return Err(IdentifierError::CounterIntegrityViolation {
                    label: self.config.label.clone(),
                    count: counters.len(),
                })
            }
        };

        tx.acquire_write_lock(EntityRef::Node(counter_id))?;
        let mut counter = tx
            .get_node(counter_id)?
            .ok_or_else(|| TransactionError::EntityNotFound(counter_id.to_string()))?;

        let current = match counter.get_property(&self.config.property) {
            Some(Value::Int(n)) => *n,
            other => {
                return Err(IdentifierError::InvalidIdentifier {
                    kind: EntityKind::Node,
                    entity: EntityRef::Node(counter_id),
                    type_name: other.map_or("null", Value::type_name),
                })
            }
        };
        let next = (self.config.increment)(current);
        counter.set_property(self.config.property.as_str(), next);
        tx.put_node(&counter)?;
        tx.commit()?;
        Ok(next)
    }
}

impl IdentifierGenerator for SequenceGenerator {
    fn name(&self) -> &str {
        "sequence"
    }

    fn generate(&self, store: &GraphStore) -> IdentifierResult<Identifier> {
        let attempts = self.config.max_attempts;
        for attempt in 1..=attempts {
            match self.try_generate(store) {
                Ok(value) => return Ok(Identifier::Number(value)),
                Err(e) if e.is_conflict() => {
                    warn!(attempt, max_attempts = attempts, error = %e, "sequence update conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        error!(label = %self.config.label, attempts, "sequence generation gave up");
        Err(IdentifierError::GenerationRetryExhausted { attempts })
    }
}
