//! Module registration, settings, and generator failures.

use std::sync::Arc;
use std::time::Duration;

use graphuid::{
    EntityKind, EntityRef, GeneratorKind, Identifier, IdentifierConfig, IdentifierError,
    IdentifierModule, IdentifierSettings, InclusionPolicy, SequenceConfig,
};
use graphuid_graph::{GraphStore, GraphStoreConfig};

use super::{create_node, identifier, load_node};

#[test]
fn test_two_modules_on_one_store() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let uuids = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new().node_inclusion(InclusionPolicy::matching(["Person"])),
    )
    .expect("failed to register uuid module");
    let numbers = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new()
            .module_id("SEQ")
            .identifier_property("number")
            .node_index_name("numberIndex")
            .relationship_index_name("numberRelIndex")
            .generator(GeneratorKind::Sequence(SequenceConfig::new())),
    )
    .expect("failed to register sequence module");
    assert_eq!(store.hook_count(), 2);
    assert_eq!(numbers.module_id(), "SEQ");

    let node = create_node(&store, |n| n.with_label("Person")).expect("create");
    let stored = load_node(&store, node.id);

    let uuid = identifier(&stored, "uuid").expect("uuid module assigned");
    assert_eq!(identifier(&stored, "number"), Some(Identifier::Number(1)));
    assert_eq!(uuids.reader().find_node_id(&uuid).expect("uuid lookup"), node.id);
    assert_eq!(numbers.reader().find_node_id(&Identifier::Number(1)).expect("lookup"), node.id);
    assert!(uuids.reader().find_node_id(&Identifier::Number(1)).is_err());

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(uuids.index(EntityKind::Node).name(), "uuidIndex");
    assert_eq!(uuids.index(EntityKind::Node).count(&tx).expect("count"), 1);
    assert_eq!(numbers.index(EntityKind::Node).count(&tx).expect("count"), 1);
}

#[test]
fn test_unknown_custom_generator_fails_registration() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let err = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new().generator(GeneratorKind::Custom("snowflake".to_owned())),
    )
    .expect_err("unknown generator");

    assert!(matches!(err, IdentifierError::GeneratorInitialization(_)));
    assert_eq!(store.hook_count(), 0);
}

#[test]
fn test_invalid_config_fails_registration() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let err = IdentifierModule::register(store, IdentifierConfig::new().identifier_property(""))
        .expect_err("empty property");
    assert!(matches!(err, IdentifierError::Config(_)));
}

#[test]
fn test_register_from_json_settings() {
    let settings = IdentifierSettings::from_json(
        r#"{
            "moduleId": "JSON",
            "identifierProperty": "id",
            "nodeIndexName": "idIndex",
            "relationshipIndexName": "idRelIndex",
            "generator": "sequence",
            "nodeInclusion": { "only": ["Order"] }
        }"#,
    )
    .expect("failed to parse settings");

    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let module = IdentifierModule::register(Arc::clone(&store), settings.into_config())
        .expect("failed to register");
    assert_eq!(module.module_id(), "JSON");
    assert!(module.config().immutable);

    let order = create_node(&store, |n| n.with_label("Order")).expect("create");
    let customer = create_node(&store, |n| n.with_label("Customer")).expect("create");

    assert_eq!(identifier(&load_node(&store, order.id), "id"), Some(Identifier::Number(1)));
    assert!(identifier(&load_node(&store, customer.id), "id").is_none());
}

#[test]
fn test_counter_integrity_violation_fails_transaction() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    for _ in 0..2 {
        create_node(&store, |n| n.with_label("SequenceMetadata").with_property("sequence", 0_i64))
            .expect("create counter");
    }

    let _module = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new().generator(GeneratorKind::Sequence(SequenceConfig::new())),
    )
    .expect("failed to register");

    let err = create_node(&store, |n| n.with_label("Person")).expect_err("two counters");
    assert!(matches!(
        IdentifierError::from_transaction_error(err),
        IdentifierError::CounterIntegrityViolation { count: 2, .. }
    ));

    // No repair is attempted
    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(tx.find_nodes_by_label("SequenceMetadata").expect("find").len(), 2);
    assert!(tx.find_nodes_by_label("Person").expect("find").is_empty());
}

#[test]
fn test_retry_exhaustion_fails_transaction() {
    let store = Arc::new(
        GraphStore::in_memory_with_config(
            GraphStoreConfig::new().lock_timeout(Duration::from_millis(20)),
        )
        .expect("failed to create store"),
    );
    let _module = IdentifierModule::register(
        Arc::clone(&store),
        IdentifierConfig::new()
            .generator(GeneratorKind::Sequence(SequenceConfig::new().max_attempts(2))),
    )
    .expect("failed to register");

    create_node(&store, |n| n.with_label("Person")).expect("first node creates the counter");
    let counter = {
        let tx = store.begin_read().expect("failed to begin read");
        tx.find_nodes_by_label("SequenceMetadata").expect("find")[0]
    };

    let mut holder = store.begin_write().expect("failed to begin write");
    holder.acquire_write_lock(EntityRef::Node(counter)).expect("failed to lock counter");

    let err = create_node(&store, |n| n.with_label("Person")).expect_err("counter is locked");
    assert!(matches!(
        IdentifierError::from_transaction_error(err),
        IdentifierError::GenerationRetryExhausted { attempts: 2 }
    ));

    holder.rollback().expect("failed to roll back");
    let node = create_node(&store, |n| n.with_label("Person")).expect("lock released");
    assert_eq!(identifier(&load_node(&store, node.id), "uuid"), Some(Identifier::Number(2)));
}
