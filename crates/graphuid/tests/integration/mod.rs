//! Integration tests for graphuid.
//!
//! These tests run the identifier engine inside a real store, through the
//! same commit pipeline applications use.

pub mod assignment;
pub mod concurrency;
pub mod durability;
pub mod immutability;
pub mod initialization;
pub mod modules;
pub mod relationships;
pub mod uniqueness;

use std::sync::Arc;

use graphuid::{Identifier, IdentifierConfig, IdentifierModule};
use graphuid_core::{Entity, EntityId, TransactionError};
use graphuid_graph::GraphStore;
use tracing_subscriber::EnvFilter;

/// Route engine logs to the test output; filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An in-memory store with one module registered.
pub fn setup(config: IdentifierConfig) -> (Arc<GraphStore>, IdentifierModule) {
    init_tracing();
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let module =
        IdentifierModule::register(Arc::clone(&store), config).expect("failed to register module");
    (store, module)
}

/// Create and commit one node built from an empty node.
pub fn create_node(
    store: &GraphStore,
    build: impl FnOnce(Entity) -> Entity,
) -> Result<Entity, TransactionError> {
    let mut tx = store.begin_write()?;
    let node = build(tx.create_node()?);
    tx.put_node(&node)?;
    tx.commit()?;
    Ok(node)
}

/// The committed state of a node.
pub fn load_node(store: &GraphStore, id: EntityId) -> Entity {
    let tx = store.begin_read().expect("failed to begin read");
    tx.get_node(id).expect("failed to get node").expect("node should exist")
}

/// The identifier stored on a node.
pub fn identifier(node: &Entity, property: &str) -> Option<Identifier> {
    node.get_property(property).and_then(Identifier::from_value)
}
