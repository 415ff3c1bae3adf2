//! Errors surfaced by graph transactions and their commit pipeline.

use thiserror::Error;

/// Boxed error raised by a commit hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a graph transaction operation or commit failed.
///
/// Only [`Self::Conflict`] is worth retrying as-is; [`Self::HookRejected`]
/// carries the typed error of whichever commit hook vetoed the commit.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The key-value backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A write through a read transaction.
    #[error("cannot write in read-only transaction")]
    ReadOnly,

    /// Use after commit or rollback.
    #[error("transaction already finished")]
    AlreadyCompleted,

    /// Optimistic validation failed, or an entity lock could not be taken in
    /// time.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// No such node.
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// No such relationship.
    #[error("relationship not found: {0}")]
    EdgeNotFound(String),

    /// A stored record did not encode or decode.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A node still has relationships, or a relationship endpoint is gone.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// A commit hook vetoed the commit. Nothing was written.
    #[error("commit rejected: {0}")]
    HookRejected(#[source] HookError),

    /// Broken store invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TransactionError {
    /// Wrap a hook failure.
    pub fn hook_rejected(err: impl Into<HookError>) -> Self {
        Self::HookRejected(err.into())
    }

    /// Whether running the same work again may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Storage(_))
    }

    /// Whether another transaction got there first.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether a node or relationship was missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound(_) | Self::EdgeNotFound(_))
    }

    /// The error a commit hook rejected the transaction with.
    #[must_use]
    pub fn hook_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::HookRejected(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result of a transaction operation.
pub type TransactionResult<T> = Result<T, TransactionError>;
