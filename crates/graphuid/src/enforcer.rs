//! Uniqueness checks against the identifier index.

use graphuid_core::EntityRef;
use graphuid_storage::Transaction;

use crate::error::{IdentifierError, IdentifierResult};
use crate::identifier::Identifier;
use crate::index::IdentifierIndex;

/// Outcome of a uniqueness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// The identifier is free, or already held by the element itself.
    Unique,
    /// Another element holds the identifier.
    Conflict(EntityRef),
}

/// Checks that an identifier is held by at most one element per kind.
///
/// Checks read the index through the committing transaction, so they see the
/// entries that transaction has already added. The forward key a check reads
/// is also the key the following [`IdentifierIndex::add`] writes; two
/// concurrent transactions claiming the same identifier therefore collide at
/// commit validation even when neither saw the other's entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyEnforcer;

impl ConsistencyEnforcer {
    /// Check whether `entity` may take `identifier`.
    pub fn check<T: Transaction>(
        tx: &T,
        index: &IdentifierIndex,
        identifier: &Identifier,
        entity: EntityRef,
    ) -> IdentifierResult<Uniqueness> {
        Ok(match index.lookup(tx, identifier)? {
            Some(existing) if existing != entity => Uniqueness::Conflict(existing),
            _ => Uniqueness::Unique,
        })
    }

    /// Like [`check`](Self::check), but a conflict is an error.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::DuplicateIdentifier`] if another element
    /// holds `identifier`.
    pub fn validate<T: Transaction>(
        tx: &T,
        index: &IdentifierIndex,
        identifier: &Identifier,
        entity: EntityRef,
    ) -> IdentifierResult<()> {
        match Self::check(tx, index, identifier, entity)? {
            Uniqueness::Unique => Ok(()),
            Uniqueness::Conflict(existing) => Err(IdentifierError::DuplicateIdentifier {
                kind: index.kind(),
                value: identifier.clone(),
                existing,
                attempted: entity,
            }),
        }
    }
}
