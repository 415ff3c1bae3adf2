//! Identifiers on relationships.

use graphuid::{EntityKind, Identifier, IdentifierConfig, IdentifierError, InclusionPolicy};
use graphuid_core::{Edge, EdgeId};
use graphuid_graph::GraphStore;

use super::setup;

fn connect(store: &GraphStore, edge_type: &str) -> Edge {
    let mut tx = store.begin_write().expect("failed to begin write");
    let a = tx.create_node().expect("create").with_label("Person");
    let b = tx.create_node().expect("create").with_label("Person");
    tx.put_node(&a).expect("put");
    tx.put_node(&b).expect("put");
    let edge = tx.create_edge(a.id, b.id, edge_type).expect("create edge");
    tx.put_edge(&edge).expect("put edge");
    tx.commit().expect("failed to commit");
    edge
}

fn load_edge(store: &GraphStore, id: EdgeId) -> Edge {
    let tx = store.begin_read().expect("failed to begin read");
    tx.get_edge(id).expect("failed to get edge").expect("edge should exist")
}

fn edge_identifier(edge: &Edge) -> Option<Identifier> {
    edge.get_property("uuid").and_then(Identifier::from_value)
}

#[test]
fn test_relationships_excluded_by_default() {
    let (store, module) = setup(IdentifierConfig::new());

    let edge = connect(&store, "KNOWS");
    assert!(edge_identifier(&load_edge(&store, edge.id)).is_none());

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 2);
    assert_eq!(module.index(EntityKind::Relationship).count(&tx).expect("count"), 0);
}

#[test]
fn test_included_relationship_types_receive_identifiers() {
    let (store, module) =
        setup(IdentifierConfig::new().relationship_inclusion(InclusionPolicy::matching(["KNOWS"])));

    let knows = connect(&store, "KNOWS");
    let likes = connect(&store, "LIKES");

    let uuid = edge_identifier(&load_edge(&store, knows.id)).expect("KNOWS gets a uuid");
    assert!(edge_identifier(&load_edge(&store, likes.id)).is_none());

    let reader = module.reader();
    assert_eq!(reader.find_relationship_id(&uuid).expect("lookup"), knows.id);
    assert_eq!(reader.find_relationship(&uuid).expect("lookup").edge_type.as_str(), "KNOWS");
    assert!(reader.find_node_id(&uuid).expect_err("wrong kind").is_not_found());
}

#[test]
fn test_relationship_identifiers_are_immutable() {
    let (store, _module) = setup(IdentifierConfig::new().relationship_inclusion(InclusionPolicy::All));
    let edge = connect(&store, "KNOWS");
    let before = edge_identifier(&load_edge(&store, edge.id)).expect("uuid");

    let mut tx = store.begin_write().expect("failed to begin write");
    let updated = load_edge(&store, edge.id).with_property("uuid", "changed");
    tx.put_edge(&updated).expect("put");
    let err = IdentifierError::from_transaction_error(tx.commit().expect_err("immutable"));
    assert!(matches!(
        err,
        IdentifierError::ImmutableIdentifier { kind: EntityKind::Relationship, .. }
    ));

    assert_eq!(edge_identifier(&load_edge(&store, edge.id)), Some(before));
}

#[test]
fn test_deleted_relationship_leaves_the_index() {
    let (store, module) = setup(IdentifierConfig::new().relationship_inclusion(InclusionPolicy::All));
    let edge = connect(&store, "KNOWS");
    let uuid = edge_identifier(&load_edge(&store, edge.id)).expect("uuid");

    let mut tx = store.begin_write().expect("failed to begin write");
    assert!(tx.delete_edge(edge.id).expect("delete"));
    tx.commit().expect("commit");

    assert!(module.reader().find_relationship_id(&uuid).expect_err("gone").is_not_found());
}

#[test]
fn test_duplicate_relationship_identifier_rejected() {
    let (store, _module) = setup(IdentifierConfig::new().relationship_inclusion(InclusionPolicy::All));

    let mut tx = store.begin_write().expect("failed to begin write");
    let a = tx.create_node().expect("create");
    let b = tx.create_node().expect("create");
    tx.put_node(&a).expect("put");
    tx.put_node(&b).expect("put");
    for _ in 0..2 {
        let edge = tx.create_edge(a.id, b.id, "KNOWS").expect("edge").with_property("uuid", "r1");
        tx.put_edge(&edge).expect("put edge");
    }
    let err = IdentifierError::from_transaction_error(tx.commit().expect_err("duplicate"));
    assert!(matches!(
        err,
        IdentifierError::DuplicateIdentifier { kind: EntityKind::Relationship, .. }
    ));
}
