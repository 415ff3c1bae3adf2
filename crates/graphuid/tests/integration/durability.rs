//! Identifiers and index entries survive reopening a file-backed store.

use std::sync::Arc;

use graphuid::{
    EntityKind, GeneratorKind, Identifier, IdentifierConfig, IdentifierError, IdentifierModule,
    SequenceConfig,
};
use graphuid_graph::GraphStore;
use tempfile::tempdir;

use super::{create_node, identifier, load_node};

fn open(path: &std::path::Path, config: IdentifierConfig) -> (Arc<GraphStore>, IdentifierModule) {
    let store = Arc::new(GraphStore::open(path).expect("failed to open store"));
    let module =
        IdentifierModule::register(Arc::clone(&store), config).expect("failed to register module");
    (store, module)
}

#[test]
fn test_identifiers_survive_reopen() {
    let dir = tempdir().expect("failed to create temp dir");
    let path = dir.path().join("graph.redb");

    let (node_id, uuid) = {
        let (store, _module) = open(&path, IdentifierConfig::new());
        let node = create_node(&store, |n| n.with_label("Person")).expect("create");
        let uuid = identifier(&load_node(&store, node.id), "uuid").expect("uuid");
        (node.id, uuid)
    };

    let (store, module) = open(&path, IdentifierConfig::new());
    assert_eq!(module.reader().find_node_id(&uuid).expect("lookup after reopen"), node_id);

    let err = create_node(&store, |n| n.with_property("uuid", uuid.to_value()))
        .expect_err("reopened index still enforces uniqueness");
    assert!(matches!(
        IdentifierError::from_transaction_error(err),
        IdentifierError::DuplicateIdentifier { .. }
    ));
}

#[test]
fn test_sequence_resumes_after_reopen() {
    let dir = tempdir().expect("failed to create temp dir");
    let path = dir.path().join("graph.redb");
    let config = || IdentifierConfig::new().generator(GeneratorKind::Sequence(SequenceConfig::new()));

    {
        let (store, _module) = open(&path, config());
        for _ in 0..3 {
            create_node(&store, |n| n).expect("create");
        }
    }

    let (store, module) = open(&path, config());
    let node = create_node(&store, |n| n).expect("create");
    assert_eq!(identifier(&load_node(&store, node.id), "uuid"), Some(Identifier::Number(4)));

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 4);
}

#[test]
fn test_reopen_with_conflicting_index_definition_fails() {
    let dir = tempdir().expect("failed to create temp dir");
    let path = dir.path().join("graph.redb");

    {
        let (_store, _module) = open(&path, IdentifierConfig::new());
    }

    let store = Arc::new(GraphStore::open(&path).expect("failed to open store"));
    let err = IdentifierModule::register(store, IdentifierConfig::new().identifier_property("guid"))
        .expect_err("index already belongs to the uuid property");
    assert!(matches!(err, IdentifierError::Config(_)));
}
