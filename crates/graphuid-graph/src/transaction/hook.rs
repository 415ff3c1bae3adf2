//! Commit hooks.

use graphuid_core::{TransactionDiff, TransactionError};

use super::GraphTransaction;

/// Callback run by the store before a write transaction becomes durable.
///
/// A hook sees the full [`TransactionDiff`] and the transaction itself, so it
/// can add writes of its own (they commit atomically with the caller's) or
/// reject the whole transaction by returning an error. Hooks run before the
/// store's commit lock is taken; a hook may open and commit other
/// transactions on the same store.
///
/// Hooks are registered with
/// [`GraphStore::register_hook`](crate::GraphStore::register_hook) and run in
/// registration order. Writes a hook makes are not fed back into the diff.
///
/// # Example
///
/// ```ignore
/// struct RejectAll;
///
/// impl CommitHook for RejectAll {
///     fn name(&self) -> &str {
///         "reject-all"
///     }
///
///     fn before_commit(
///         &self,
///         _tx: &mut GraphTransaction<'_>,
///         _diff: &TransactionDiff,
///     ) -> Result<(), TransactionError> {
///         Err(TransactionError::hook_rejected("read-only store"))
///     }
/// }
/// ```
pub trait CommitHook: Send + Sync {
    /// A short name for logging.
    fn name(&self) -> &str;

    /// Inspect and extend a transaction that is about to commit.
    ///
    /// # Errors
    ///
    /// Any error aborts the transaction and is returned from its `commit`.
    fn before_commit(
        &self,
        tx: &mut GraphTransaction<'_>,
        diff: &TransactionDiff,
    ) -> Result<(), TransactionError>;
}
