//! graphuid - Transactional identifier assignment for an embedded graph store
//!
//! graphuid gives nodes and relationships stable, unique identifiers stored as
//! ordinary properties. It runs inside the store's commit pipeline: every
//! write transaction is checked before it becomes durable, new elements
//! receive identifiers atomically with their creation, and transactions that
//! would duplicate or change an identifier are rejected as a whole.
//!
//! # Features
//!
//! - **Automatic assignment**: Qualifying elements get an identifier when the
//!   transaction creating them commits
//! - **Uniqueness**: At most one element per kind holds an identifier, across
//!   concurrent transactions
//! - **Immutability**: Assigned identifiers cannot be removed or changed
//!   unless the module is configured otherwise
//! - **Pluggable generators**: Random UUIDs, a durable sequence, or your own
//! - **Backfill**: Existing elements are brought under management in batches
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use graphuid::{Identifier, IdentifierConfig, IdentifierModule};
//! use graphuid_graph::GraphStore;
//!
//! let store = Arc::new(GraphStore::in_memory()?);
//! let module = IdentifierModule::register(
//!     Arc::clone(&store),
//!     IdentifierConfig::new().strip_hyphens(true),
//! )?;
//!
//! // Created nodes receive a uuid when the transaction commits
//! let mut tx = store.begin_write()?;
//! let alice = tx.create_node()?.with_label("Person").with_property("name", "Alice");
//! tx.put_node(&alice)?;
//! tx.commit()?;
//!
//! // Pre-assigned identifiers are kept, and must be unique
//! let mut tx = store.begin_write()?;
//! let bob = tx.create_node()?.with_label("Person").with_property("uuid", "bob-1");
//! tx.put_node(&bob)?;
//! tx.commit()?;
//!
//! let found = module.reader().find_node_id(&Identifier::from("bob-1"))?;
//! assert_eq!(found, bob.id);
//! ```
//!
//! # Configuration
//!
//! [`IdentifierConfig`] is built with chained setters; [`IdentifierSettings`]
//! is the same configuration as plain data, loadable from JSON:
//!
//! ```ignore
//! let config = IdentifierSettings::from_json(r#"{ "generator": "sequence" }"#)?.into_config();
//! ```
//!
//! # Modules
//!
//! - [`identifier`] - Identifier values and their index key encoding
//! - [`config`] - Module configuration and inclusion policies
//! - [`generator`] - Identifier generators
//! - [`index`] - The identifier index
//! - [`enforcer`] - Uniqueness checks
//! - [`coordinator`] - The commit hook that assigns and validates identifiers
//! - [`reader`] - Lookups by identifier
//! - [`module`] - Module registration

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod coordinator;
pub mod enforcer;
pub mod error;
pub mod generator;
pub mod identifier;
pub mod index;
pub mod module;
pub mod reader;

pub use config::{
    Classified, GeneratorKind, IdentifierConfig, IdentifierSettings, InclusionPolicy,
    InclusionSetting,
};
pub use coordinator::{AssignmentCoordinator, InitializationReport, KindReport};
pub use enforcer::{ConsistencyEnforcer, Uniqueness};
pub use error::{IdentifierChange, IdentifierError, IdentifierResult};
pub use generator::{
    GeneratorRegistry, IdentifierGenerator, RandomGenerator, SequenceConfig, SequenceGenerator,
};
pub use identifier::Identifier;
pub use index::{IdentifierIndex, IndexDescriptor};
pub use module::IdentifierModule;
pub use reader::IdentifierReader;

pub use graphuid_core::{EntityKind, EntityRef};
