//! Failures of node and relationship storage.

use graphuid_core::{CoreError, EdgeId, EntityId, TransactionError};
use graphuid_storage::StorageError;
use thiserror::Error;

/// What [`NodeStore`](super::NodeStore) and [`EdgeStore`](super::EdgeStore)
/// report.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No node with this id.
    #[error("node {0} not found")]
    EntityNotFound(EntityId),

    /// No relationship with this id.
    #[error("relationship {0} not found")]
    EdgeNotFound(EdgeId),

    /// A relationship endpoint names a missing node.
    #[error("relationship endpoint {0} does not exist")]
    InvalidEntityReference(EntityId),

    /// A caller-chosen node id is taken.
    #[error("node {0} already exists")]
    EntityAlreadyExists(EntityId),

    /// A record or key failed to encode or decode.
    #[error(transparent)]
    Encoding(#[from] CoreError),

    /// The backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An index entry points at nothing or cannot be parsed.
    #[error("corrupt graph data: {0}")]
    DataCorruption(String),
}

impl From<GraphError> for TransactionError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::EntityNotFound(id) | GraphError::InvalidEntityReference(id) => {
                Self::EntityNotFound(id.to_string())
            }
            GraphError::EdgeNotFound(id) => Self::EdgeNotFound(id.to_string()),
            GraphError::Encoding(e) => Self::Serialization(e.to_string()),
            GraphError::Storage(e) => storage_error_to_transaction_error(&e),
            GraphError::EntityAlreadyExists(_) | GraphError::DataCorruption(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

/// Map a backend failure onto the transaction error callers see.
pub fn storage_error_to_transaction_error(err: &StorageError) -> TransactionError {
    match err {
        StorageError::ReadOnly => TransactionError::ReadOnly,
        StorageError::Conflict(msg) => TransactionError::Conflict(msg.clone()),
        StorageError::Serialization(msg) => TransactionError::Serialization(msg.clone()),
        _ => TransactionError::Storage(err.to_string()),
    }
}

/// Result of a store operation.
pub type GraphResult<T> = Result<T, GraphError>;
