//! Uniqueness enforcement.

use graphuid::{EntityKind, Identifier, IdentifierConfig, IdentifierError};
use graphuid_core::TransactionError;

use super::{create_node, identifier, load_node, setup};

#[test]
fn test_duplicate_in_one_transaction_rejected() {
    let (store, module) = setup(IdentifierConfig::new());

    let mut tx = store.begin_write().expect("failed to begin write");
    let a = tx.create_node().expect("create").with_property("uuid", "123");
    let b = tx.create_node().expect("create").with_property("uuid", "123");
    tx.put_node(&a).expect("put");
    tx.put_node(&b).expect("put");

    let err = tx.commit().expect_err("duplicate must be rejected");
    assert!(matches!(err, TransactionError::HookRejected(_)));
    let err = IdentifierError::from_transaction_error(err);
    assert!(matches!(
        err,
        IdentifierError::DuplicateIdentifier { kind: EntityKind::Node, ref value, .. }
            if *value == Identifier::from("123")
    ));

    // Neither node exists, and nothing was indexed
    let tx = store.begin_read().expect("failed to begin read");
    assert!(tx.get_node(a.id).expect("get").is_none());
    assert!(tx.get_node(b.id).expect("get").is_none());
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 0);
}

#[test]
fn test_duplicate_of_committed_identifier_rejected() {
    let (store, module) = setup(IdentifierConfig::new());

    let existing = create_node(&store, |n| n.with_property("uuid", "taken")).expect("create");

    let err = create_node(&store, |n| n.with_property("uuid", "taken")).expect_err("duplicate");
    match IdentifierError::from_transaction_error(err) {
        IdentifierError::DuplicateIdentifier { existing: holder, .. } => {
            assert_eq!(holder, existing.id.into());
        }
        other => panic!("expected a duplicate error, got {other}"),
    }

    assert_eq!(
        module.reader().find_node_id(&Identifier::from("taken")).expect("lookup"),
        existing.id
    );
    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(tx.count_nodes().expect("count"), 1);
}

#[test]
fn test_duplicate_through_later_update_rejected() {
    let (store, _module) = setup(IdentifierConfig::new().immutable(false));

    create_node(&store, |n| n.with_property("uuid", "first")).expect("create");
    let second = create_node(&store, |n| n.with_property("uuid", "second")).expect("create");

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut node = tx.get_node(second.id).expect("get").expect("exists");
    node.set_property("uuid", "first");
    tx.put_node(&node).expect("put");
    let err = IdentifierError::from_transaction_error(tx.commit().expect_err("duplicate"));
    assert!(matches!(err, IdentifierError::DuplicateIdentifier { .. }));

    assert_eq!(
        identifier(&load_node(&store, second.id), "uuid"),
        Some(Identifier::from("second"))
    );
}

#[test]
fn test_same_identifier_allowed_across_kinds() {
    let (store, module) =
        setup(IdentifierConfig::new().relationship_inclusion(graphuid::InclusionPolicy::All));

    let mut tx = store.begin_write().expect("failed to begin write");
    let a = tx.create_node().expect("create").with_property("uuid", "shared");
    let b = tx.create_node().expect("create");
    tx.put_node(&a).expect("put");
    tx.put_node(&b).expect("put");
    let edge = tx.create_edge(a.id, b.id, "KNOWS").expect("edge").with_property("uuid", "shared");
    tx.put_edge(&edge).expect("put edge");
    tx.commit().expect("node and relationship may share a value");

    let reader = module.reader();
    assert_eq!(reader.find_node_id(&Identifier::from("shared")).expect("node"), a.id);
    assert_eq!(reader.find_relationship_id(&Identifier::from("shared")).expect("rel"), edge.id);
}

#[test]
fn test_number_and_text_identifiers_are_distinct() {
    let (store, module) = setup(IdentifierConfig::new());

    let text = create_node(&store, |n| n.with_property("uuid", "7")).expect("create");
    let number = create_node(&store, |n| n.with_property("uuid", 7_i64)).expect("create");

    assert_eq!(module.reader().find_node_id(&Identifier::from("7")).expect("text"), text.id);
    assert_eq!(module.reader().find_node_id(&Identifier::Number(7)).expect("number"), number.id);
}
