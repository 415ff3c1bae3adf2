//! Identifier index.
//!
//! One index per element kind maps identifiers to elements and back. Entries
//! live in the host store next to the graph data and are written through the
//! same transaction as the change that caused them, so the index reflects
//! exactly the committed transactions.
//!
//! # Tables
//!
//! - `uid_fwd:{name}` - encoded identifier to raw element id (big-endian)
//! - `uid_rev:{name}` - raw element id to encoded identifier
//!
//! Each index also has a descriptor in the store's
//! [`index catalog`](graphuid_graph::store::TABLE_INDEX_CATALOG), recording the
//! kind, property and owning module it was created for. The first `add` or
//! `remove` writes it if [`IdentifierIndex::ensure`] never ran; lookups on an
//! index that does not exist yet simply miss.

use graphuid_core::encoding::{Decoder, Encoder, Record};
use graphuid_core::{CoreError, EntityKind, EntityRef};
use graphuid_graph::store::TABLE_INDEX_CATALOG;
use graphuid_storage::{Cursor, Transaction};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_IDENTIFIER_PROPERTY, DEFAULT_MODULE_ID};
use crate::error::{IdentifierError, IdentifierResult};
use crate::identifier::Identifier;

/// Catalog entry describing an identifier index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,
    /// Kind of the indexed elements.
    pub kind: EntityKind,
    /// Property the identifiers are read from.
    pub property: String,
    /// Module that created the index.
    pub module_id: String,
}

impl Record for IndexDescriptor {}

/// A named identifier index for one element kind.
///
/// `IdentifierIndex` holds no state beyond its name and owner; every operation
/// goes through the transaction it is given. Lookups through a write transaction
/// see that transaction's own index writes.
///
/// # Example
///
/// ```ignore
/// let index = IdentifierIndex::new(EntityKind::Node, "uuidIndex");
/// index.add(&mut tx, &Identifier::from("abc"), EntityRef::Node(id))?;
/// assert_eq!(index.lookup(&tx, &Identifier::from("abc"))?, Some(EntityRef::Node(id)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierIndex {
    kind: EntityKind,
    name: String,
    property: String,
    module_id: String,
    forward_table: String,
    reverse_table: String,
}

impl IdentifierIndex {
    /// Create a handle for the index `name` over elements of `kind`, owned by
    /// the default module and property.
    #[must_use]
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            property: DEFAULT_IDENTIFIER_PROPERTY.to_owned(),
            module_id: DEFAULT_MODULE_ID.to_owned(),
            forward_table: format!("uid_fwd:{name}"),
            reverse_table: format!("uid_rev:{name}"),
            name,
        }
    }

    /// Set the property and module recorded when the index is created lazily.
    #[must_use]
    pub fn owned_by(mut self, property: impl Into<String>, module_id: impl Into<String>) -> Self {
        self.property = property.into();
        self.module_id = module_id.into();
        self
    }

    /// The indexed element kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the catalog entry, or check an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Config`] if an index of this name already
    /// exists for a different kind or property.
    pub fn ensure<T: Transaction>(
        &self,
        tx: &mut T,
        property: &str,
        module_id: &str,
    ) -> IdentifierResult<IndexDescriptor> {
        if let Some(existing) = self.descriptor(tx)? {
            if existing.kind != self.kind || existing.property != property {
                return Err(IdentifierError::Config(format!(
                    "index {} already exists for the {} property of {}s",
                    self.name, existing.property, existing.kind
                )));
            }
            return Ok(existing);
        }

        let descriptor = IndexDescriptor {
            name: self.name.clone(),
            kind: self.kind,
            property: property.to_owned(),
            module_id: module_id.to_owned(),
        };
        let bytes = descriptor.encode().map_err(encoding_error)?;
        tx.put(TABLE_INDEX_CATALOG, self.name.as_bytes(), &bytes)?;
        Ok(descriptor)
    }

    /// The catalog entry, if the index has been created.
    pub fn descriptor<T: Transaction>(&self, tx: &T) -> IdentifierResult<Option<IndexDescriptor>> {
        tx.get(TABLE_INDEX_CATALOG, self.name.as_bytes())?
            .map(|bytes| IndexDescriptor::decode(&bytes).map_err(encoding_error))
            .transpose()
    }

    /// Returns `true` if the index has been created.
    pub fn exists<T: Transaction>(&self, tx: &T) -> IdentifierResult<bool> {
        Ok(tx.get(TABLE_INDEX_CATALOG, self.name.as_bytes())?.is_some())
    }

    fn create_if_missing<T: Transaction>(&self, tx: &mut T) -> IdentifierResult<()> {
        if !self.exists(tx)? {
            self.ensure(tx, &self.property, &self.module_id)?;
        }
        Ok(())
    }

    /// Map `identifier` to `entity`, replacing the entity's previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::DuplicateIdentifier`] if another element
    /// already holds `identifier`.
    pub fn add<T: Transaction>(
        &self,
        tx: &mut T,
        identifier: &Identifier,
        entity: EntityRef,
    ) -> IdentifierResult<()> {
        self.check_kind(entity)?;
        self.create_if_missing(tx)?;
        let key = identifier.encode_key();
        let raw = entity.raw_id().to_be_bytes();

        if let Some(existing) = self.lookup(tx, identifier)? {
            if existing != entity {
                return Err(IdentifierError::DuplicateIdentifier {
                    kind: self.kind,
                    value: identifier.clone(),
                    existing,
                    attempted: entity,
                });
            }
        }
        if let Some(old_key) = tx.get(&self.reverse_table, &raw)? {
            if old_key != key {
                tx.delete(&self.forward_table, &old_key)?;
            }
        }

        tx.put(&self.forward_table, &key, &raw)?;
        tx.put(&self.reverse_table, &raw, &key)?;
        Ok(())
    }

    /// Drop the entry of `entity`, returning the identifier it held.
    pub fn remove<T: Transaction>(
        &self,
        tx: &mut T,
        entity: EntityRef,
    ) -> IdentifierResult<Option<Identifier>> {
        self.check_kind(entity)?;
        self.create_if_missing(tx)?;
        let raw = entity.raw_id().to_be_bytes();
        let Some(key) = tx.get(&self.reverse_table, &raw)? else {
            return Ok(None);
        };
        tx.delete(&self.forward_table, &key)?;
        tx.delete(&self.reverse_table, &raw)?;
        decode_identifier(&key).map(Some)
    }

    /// The element holding `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::NotFound`] if no element holds it.
    pub fn get<T: Transaction>(&self, tx: &T, identifier: &Identifier) -> IdentifierResult<EntityRef> {
        self.lookup(tx, identifier)?.ok_or_else(|| IdentifierError::NotFound {
            kind: self.kind,
            value: identifier.clone(),
        })
    }

    /// The element holding `identifier`, if any.
    pub fn lookup<T: Transaction>(
        &self,
        tx: &T,
        identifier: &Identifier,
    ) -> IdentifierResult<Option<EntityRef>> {
        tx.get(&self.forward_table, &identifier.encode_key())?
            .map(|raw| self.decode_entity(&raw))
            .transpose()
    }

    /// The identifier indexed for `entity`, if any.
    pub fn identifier_of<T: Transaction>(
        &self,
        tx: &T,
        entity: EntityRef,
    ) -> IdentifierResult<Option<Identifier>> {
        self.check_kind(entity)?;
        tx.get(&self.reverse_table, &entity.raw_id().to_be_bytes())?
            .map(|key| decode_identifier(&key))
            .transpose()
    }

    /// Number of entries.
    pub fn count<T: Transaction>(&self, tx: &T) -> IdentifierResult<usize> {
        let mut cursor = tx.cursor(&self.forward_table)?;
        let mut count = 0;
        while cursor.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// All entries in identifier order.
    pub fn entries<T: Transaction>(&self, tx: &T) -> IdentifierResult<Vec<(Identifier, EntityRef)>> {
        let mut cursor = tx.cursor(&self.forward_table)?;
        let mut entries = Vec::new();
        while let Some((key, raw)) = cursor.next()? {
            entries.push((decode_identifier(&key)?, self.decode_entity(&raw)?));
        }
        Ok(entries)
    }

    fn check_kind(&self, entity: EntityRef) -> IdentifierResult<()> {
        if entity.kind() == self.kind {
            Ok(())
        } else {
            Err(IdentifierError::Config(format!(
                "index {} holds {}s, not {entity}",
                self.name, self.kind
            )))
        }
    }

    fn decode_entity(&self, raw: &[u8]) -> IdentifierResult<EntityRef> {
        let bytes: [u8; 8] = raw.try_into().map_err(|_| {
            IdentifierError::Encoding(format!("malformed entry in index {}", self.name))
        })?;
        Ok(EntityRef::from_raw(self.kind, u64::from_be_bytes(bytes)))
    }
}

fn decode_identifier(key: &[u8]) -> IdentifierResult<Identifier> {
    Identifier::decode_key(key)
        .ok_or_else(|| IdentifierError::Encoding("malformed identifier key".to_owned()))
}

#[allow(clippy::needless_pass_by_value)]
fn encoding_error(err: CoreError) -> IdentifierError {
    IdentifierError::Encoding(err.to_string())
}
