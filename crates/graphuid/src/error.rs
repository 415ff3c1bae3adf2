//! Error types for the identifier engine.

use std::fmt;

use graphuid_core::{EntityKind, EntityRef, TransactionError};
use graphuid_graph::store::storage_error_to_transaction_error;
use graphuid_storage::StorageError;
use thiserror::Error;

use crate::identifier::Identifier;

/// How a transaction tried to change an immutable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierChange {
    /// The identifier property was removed.
    Removed,
    /// The identifier property was given a different value.
    Modified,
}

impl fmt::Display for IdentifierChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Removed => "remove",
            Self::Modified => "modify",
        })
    }
}

/// Errors raised by the identifier engine.
#[derive(Debug, Error)]
pub enum IdentifierError {
    /// Another element of the same kind already holds the identifier.
    #[error("another {kind} with identifier {value} already exists ({existing}), rejected for {attempted}")]
    DuplicateIdentifier {
        /// Kind of both elements.
        kind: EntityKind,
        /// The contested identifier.
        value: Identifier,
        /// The element that holds the identifier.
        existing: EntityRef,
        /// The element that tried to take it.
        attempted: EntityRef,
    },

    /// A transaction tried to remove or change an assigned identifier.
    #[error("you are not allowed to {change} the {property} property of {entity}")]
    ImmutableIdentifier {
        /// Kind of the element.
        kind: EntityKind,
        /// The element.
        entity: EntityRef,
        /// The identifier property name.
        property: String,
        /// What the transaction tried to do.
        change: IdentifierChange,
    },

    /// The identifier property holds a value that cannot be an identifier.
    #[error("{entity} has a {type_name} value in its identifier property")]
    InvalidIdentifier {
        /// Kind of the element.
        kind: EntityKind,
        /// The element.
        entity: EntityRef,
        /// Type of the offending value.
        type_name: &'static str,
    },

    /// No element of this kind holds the identifier.
    #[error("no {kind} with identifier {value}")]
    NotFound {
        /// Kind that was searched.
        kind: EntityKind,
        /// The identifier that was looked up.
        value: Identifier,
    },

    /// The configured generator could not be created.
    #[error("failed to initialize identifier generator: {0}")]
    GeneratorInitialization(String),

    /// The sequence generator kept conflicting with concurrent callers.
    #[error("identifier generation failed after {attempts} attempts")]
    GenerationRetryExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// More than one sequence counter entity exists.
    #[error("found {count} nodes labelled {label}, expected exactly one sequence counter")]
    CounterIntegrityViolation {
        /// The counter marker label.
        label: String,
        /// Number of counters found.
        count: usize,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An index record could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The host transaction failed.
    #[error("transaction error: {0}")]
    Transaction(TransactionError),
}

impl IdentifierError {
    /// Recover an identifier error that crossed the commit pipeline.
    ///
    /// The store reports hook failures as
    /// [`TransactionError::HookRejected`]; this unwraps the typed error again.
    /// Any other transaction error is wrapped in [`Self::Transaction`].
    #[must_use]
    pub fn from_transaction_error(err: TransactionError) -> Self {
        match err {
            TransactionError::HookRejected(source) => match source.downcast::<Self>() {
                Ok(err) => *err,
                Err(other) => Self::Transaction(TransactionError::HookRejected(other)),
            },
            other => Self::Transaction(other),
        }
    }

    /// Convert into the error a commit hook reports to the store.
    ///
    /// Transaction errors pass through unchanged, so a conflict stays a
    /// conflict; everything else becomes a hook rejection.
    #[must_use]
    pub fn into_transaction_error(self) -> TransactionError {
        match self {
            Self::Transaction(err) => err,
            other => TransactionError::hook_rejected(other),
        }
    }

    /// Returns `true` for a lookup miss.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the host reported a write-write conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Transaction(TransactionError::Conflict(_)))
    }
}

impl From<TransactionError> for IdentifierError {
    fn from(err: TransactionError) -> Self {
        Self::from_transaction_error(err)
    }
}

impl From<StorageError> for IdentifierError {
    fn from(err: StorageError) -> Self {
        Self::Transaction(storage_error_to_transaction_error(&err))
    }
}

/// Result type alias for identifier operations.
pub type IdentifierResult<T> = Result<T, IdentifierError>;
