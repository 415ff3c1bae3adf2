//! Exclusive, transaction-scoped entity locks.
//!
//! A lock belongs to one transaction until that transaction commits, rolls
//! back, or is dropped. Locks are reentrant: a transaction that already holds
//! a lock acquires it again immediately. Waiting is bounded; a waiter that
//! runs out of time gets a [`TransactionError::Conflict`] and is expected to
//! retry its whole transaction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use graphuid_core::{EntityRef, TransactionError};
use parking_lot::{Condvar, Mutex};
use tracing::debug;

/// Grants exclusive entity locks to transactions.
#[derive(Debug, Default)]
pub struct LockManager {
    /// Current owner (transaction id) of each locked entity.
    owners: Mutex<HashMap<EntityRef, u64>>,
    /// Signalled whenever locks are released.
    released: Condvar,
}

impl LockManager {
    /// Create a lock manager with no locks held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `entity` for transaction `tx_id`, waiting at most `timeout`.
    ///
    /// Returns `true` if the lock was newly taken, `false` if `tx_id`
    /// already held it.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Conflict`] if another transaction still
    /// holds the lock when the timeout expires.
    pub fn acquire(
        &self,
        tx_id: u64,
        entity: EntityRef,
        timeout: Duration,
    ) -> Result<bool, TransactionError> {
        let deadline = Instant::now() + timeout;
        let mut owners = self.owners.lock();

        loop {
            match owners.get(&entity) {
                None => {
                    owners.insert(entity, tx_id);
                    return Ok(true);
                }
                Some(&owner) if owner == tx_id => return Ok(false),
                Some(&owner) => {
                    if self.released.wait_until(&mut owners, deadline).timed_out()
                        && owners.get(&entity).is_some_and(|&o| o != tx_id)
                    {
                        debug!(tx_id, owner, %entity, "lock wait timed out");
                        return Err(TransactionError::Conflict(format!(
                            "timed out waiting for lock on {entity} held by transaction {owner}"
                        )));
                    }
                }
            }
        }
    }

    /// Release every lock held by `tx_id`.
    pub fn release_all(&self, tx_id: u64) {
        let mut owners = self.owners.lock();
        let before = owners.len();
        owners.retain(|_, owner| *owner != tx_id);
        if owners.len() != before {
            self.released.notify_all();
        }
    }

    /// The transaction currently holding the lock on `entity`.
    #[must_use]
    pub fn holder(&self, entity: EntityRef) -> Option<u64> {
        self.owners.lock().get(&entity).copied()
    }
}
