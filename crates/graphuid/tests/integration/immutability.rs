//! Immutable and mutable identifier modes.

use graphuid::{Identifier, IdentifierChange, IdentifierConfig, IdentifierError};

use super::{create_node, identifier, load_node, setup};

#[test]
fn test_changing_identifier_rejected() {
    let (store, module) = setup(IdentifierConfig::new());
    let node = create_node(&store, |n| n.with_property("uuid", "abc")).expect("create");

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut updated = tx.get_node(node.id).expect("get").expect("exists");
    updated.set_property("uuid", "xyz");
    tx.put_node(&updated).expect("put");
    let err = tx.commit().expect_err("change must be rejected");

    let err = IdentifierError::from_transaction_error(err);
    assert!(matches!(
        err,
        IdentifierError::ImmutableIdentifier { change: IdentifierChange::Modified, .. }
    ));
    assert_eq!(
        err.to_string(),
        format!("you are not allowed to modify the uuid property of node#{}", node.id)
    );

    assert_eq!(identifier(&load_node(&store, node.id), "uuid"), Some(Identifier::from("abc")));
    assert_eq!(module.reader().find_node_id(&Identifier::from("abc")).expect("lookup"), node.id);
    assert!(module.reader().find_node_id(&Identifier::from("xyz")).is_err());
}

#[test]
fn test_removing_identifier_rejected() {
    let (store, _module) = setup(IdentifierConfig::new());
    let node = create_node(&store, |n| n).expect("create");
    let before = identifier(&load_node(&store, node.id), "uuid").expect("uuid");

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut updated = tx.get_node(node.id).expect("get").expect("exists");
    updated.remove_property("uuid");
    tx.put_node(&updated).expect("put");
    let err = IdentifierError::from_transaction_error(tx.commit().expect_err("removal"));
    assert!(matches!(
        err,
        IdentifierError::ImmutableIdentifier { change: IdentifierChange::Removed, .. }
    ));

    assert_eq!(identifier(&load_node(&store, node.id), "uuid"), Some(before));
}

#[test]
fn test_other_changes_allowed() {
    let (store, _module) = setup(IdentifierConfig::new());
    let node = create_node(&store, |n| n.with_property("uuid", "abc")).expect("create");

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut updated = tx.get_node(node.id).expect("get").expect("exists");
    updated.set_property("name", "renamed");
    updated.set_property("uuid", "abc");
    tx.put_node(&updated).expect("put");
    tx.commit().expect("unrelated changes must commit");

    let stored = load_node(&store, node.id);
    assert_eq!(identifier(&stored, "name"), Some(Identifier::from("renamed")));
    assert_eq!(identifier(&stored, "uuid"), Some(Identifier::from("abc")));
}

#[test]
fn test_mutable_mode_allows_change() {
    let (store, module) = setup(IdentifierConfig::new().immutable(false));
    let node = create_node(&store, |n| n.with_property("uuid", "abc")).expect("create");

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut updated = tx.get_node(node.id).expect("get").expect("exists");
    updated.set_property("uuid", "xyz");
    tx.put_node(&updated).expect("put");
    tx.commit().expect("mutable mode allows changes");

    let reader = module.reader();
    assert_eq!(reader.find_node_id(&Identifier::from("xyz")).expect("lookup"), node.id);
    assert!(reader.find_node_id(&Identifier::from("abc")).expect_err("old value").is_not_found());
}

#[test]
fn test_mutable_mode_reassigns_removed_identifier() {
    let (store, module) = setup(IdentifierConfig::new().immutable(false));
    let node = create_node(&store, |n| n.with_property("uuid", "abc")).expect("create");

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut updated = tx.get_node(node.id).expect("get").expect("exists");
    updated.remove_property("uuid");
    tx.put_node(&updated).expect("put");
    tx.commit().expect("mutable mode allows removal");

    let fresh = identifier(&load_node(&store, node.id), "uuid").expect("reassigned uuid");
    assert_ne!(fresh, Identifier::from("abc"));
    assert_eq!(fresh.as_text().map(str::len), Some(36));

    let reader = module.reader();
    assert_eq!(reader.find_node_id(&fresh).expect("lookup"), node.id);
    assert!(reader.find_node_id(&Identifier::from("abc")).is_err());
}
