//! Backfill of elements created before a module was registered.

use std::sync::Arc;

use graphuid::{
    EntityKind, GeneratorKind, Identifier, IdentifierConfig, IdentifierError, IdentifierModule,
    InclusionPolicy, SequenceConfig,
};
use graphuid_graph::GraphStore;

use super::{create_node, identifier, load_node};

fn populated_store(nodes: usize) -> Arc<GraphStore> {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let mut tx = store.begin_write().expect("failed to begin write");
    let mut previous = None;
    for i in 0..nodes {
        let node = tx.create_node().expect("create").with_label("Person").with_property("i", i as i64);
        tx.put_node(&node).expect("put");
        if let Some(prev) = previous {
            let edge = tx.create_edge(prev, node.id, "NEXT").expect("edge");
            tx.put_edge(&edge).expect("put edge");
        }
        previous = Some(node.id);
    }
    tx.commit().expect("failed to commit");
    store
}

#[test]
fn test_initialize_assigns_missing_identifiers() {
    let store = populated_store(10);
    let legacy = create_node(&store, |n| n.with_property("uuid", "legacy")).expect("create");

    let module = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new().initialization_batch_size(3),
    )
    .expect("failed to register");

    let report = module.initialize().expect("initialization failed");
    assert_eq!(report.nodes.scanned, 11);
    assert_eq!(report.nodes.assigned, 10);
    assert_eq!(report.nodes.indexed, 1);
    assert_eq!(report.nodes.batches, 4);
    assert_eq!(report.relationships.scanned, 9);
    assert_eq!(report.relationships.assigned, 0);

    let tx = store.begin_read().expect("failed to begin read");
    for node in tx.scan_nodes(None, 100).expect("scan") {
        let uuid = identifier(&node, "uuid").expect("every node has a uuid");
        assert_eq!(module.reader().find_node_id(&uuid).expect("lookup"), node.id);
    }
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 11);
    assert_eq!(
        module.reader().find_node_id(&Identifier::from("legacy")).expect("lookup"),
        legacy.id
    );
}

#[test]
fn test_initialize_is_idempotent() {
    let store = populated_store(5);
    let module = IdentifierModule::register(Arc::clone(&store), IdentifierConfig::new())
        .expect("failed to register");

    let first = module.initialize().expect("first pass");
    assert_eq!(first.nodes.assigned, 5);

    let snapshot: Vec<_> = {
        let tx = store.begin_read().expect("failed to begin read");
        tx.scan_nodes(None, 100).expect("scan")
    };

    let second = module.initialize().expect("second pass");
    assert_eq!(second.nodes.scanned, 5);
    assert_eq!(second.nodes.assigned, 0);
    assert_eq!(second.nodes.indexed, 0);

    for node in snapshot {
        assert_eq!(load_node(&store, node.id), node);
    }
}

#[test]
fn test_initialize_covers_included_relationships() {
    let store = populated_store(4);
    let module = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new().relationship_inclusion(InclusionPolicy::All),
    )
    .expect("failed to register");

    let report = module.initialize().expect("initialization failed");
    assert_eq!(report.relationships.scanned, 3);
    assert_eq!(report.relationships.assigned, 3);

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(module.index(EntityKind::Relationship).count(&tx).expect("count"), 3);
}

#[test]
fn test_initialize_with_sequence_generator() {
    let store = populated_store(3);
    let module = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new().generator(GeneratorKind::Sequence(SequenceConfig::new())),
    )
    .expect("failed to register");

    let report = module.initialize().expect("initialization failed");
    assert_eq!(report.nodes.assigned, 3);

    let tx = store.begin_read().expect("failed to begin read");
    let mut values: Vec<_> = tx
        .find_nodes_by_label("Person")
        .expect("find")
        .into_iter()
        .map(|id| identifier(&load_node(&store, id), "uuid").and_then(|v| v.as_number()))
        .collect();
    values.sort_unstable();
    assert_eq!(values, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn test_initialize_rejects_duplicate_legacy_values() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    create_node(&store, |n| n.with_property("uuid", "same")).expect("create");
    create_node(&store, |n| n.with_property("uuid", "same")).expect("create");

    let module = IdentifierModule::register(Arc::clone(&store), IdentifierConfig::new())
        .expect("failed to register");

    let err = module.initialize().expect_err("legacy duplicates must be reported");
    assert!(matches!(err, IdentifierError::DuplicateIdentifier { .. }));
}
