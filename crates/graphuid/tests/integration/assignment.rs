//! Identifier assignment on create.

use std::sync::Arc;

use graphuid::{
    EntityKind, EntityRef, GeneratorKind, GeneratorRegistry, Identifier, IdentifierConfig,
    IdentifierError, IdentifierGenerator, IdentifierModule, IdentifierResult, InclusionPolicy,
};
use graphuid_core::{Entity, Value};
use graphuid_graph::GraphStore;

use super::{create_node, identifier, load_node, setup};

/// Always returns the same hyphenated value.
struct FixedGenerator;

impl IdentifierGenerator for FixedGenerator {
    fn name(&self) -> &str {
        "fixed"
    }

    fn generate(&self, _store: &GraphStore) -> IdentifierResult<Identifier> {
        Ok(Identifier::from("aa-bb-cc"))
    }
}

fn fixed_registry() -> GeneratorRegistry {
    let mut registry = GeneratorRegistry::new();
    registry.register("fixed", || Ok(Arc::new(FixedGenerator) as Arc<dyn IdentifierGenerator>));
    registry
}

// ============================================================================
// Basic Assignment
// ============================================================================

#[test]
fn test_created_node_receives_identifier() {
    let (store, module) = setup(IdentifierConfig::new());

    let node = create_node(&store, |n| n.with_label("Person").with_property("name", "Alice"))
        .expect("failed to create node");

    let stored = load_node(&store, node.id);
    let uuid = identifier(&stored, "uuid").expect("node should carry a uuid");
    let text = uuid.as_text().expect("random identifiers are text");
    assert_eq!(text.len(), 36);
    assert_eq!(stored.get_property("name"), Some(&Value::from("Alice")));

    assert_eq!(module.reader().find_node_id(&uuid).expect("lookup failed"), node.id);
    assert_eq!(module.reader().find_node(&uuid).expect("lookup failed"), stored);
}

#[test]
fn test_every_created_node_gets_a_distinct_identifier() {
    let (store, module) = setup(IdentifierConfig::new());

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut ids = Vec::new();
    for i in 0..20_i64 {
        let node = tx.create_node().expect("failed to create").with_property("i", i);
        tx.put_node(&node).expect("failed to put");
        ids.push(node.id);
    }
    tx.commit().expect("failed to commit");

    let mut seen = std::collections::HashSet::new();
    for id in ids {
        let uuid = identifier(&load_node(&store, id), "uuid").expect("uuid");
        assert!(seen.insert(uuid.clone()));
        assert_eq!(module.reader().find_node_id(&uuid).expect("lookup"), id);
    }

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 20);
}

#[test]
fn test_preassigned_identifier_is_kept() {
    let (store, module) = setup(IdentifierConfig::new());

    let node = create_node(&store, |n| n.with_property("uuid", "custom-42"))
        .expect("failed to create node");

    let stored = load_node(&store, node.id);
    assert_eq!(identifier(&stored, "uuid"), Some(Identifier::from("custom-42")));
    assert_eq!(
        module.reader().find_node_id(&Identifier::from("custom-42")).expect("lookup"),
        node.id
    );
}

#[test]
fn test_integer_identifiers_are_accepted() {
    let (store, module) = setup(IdentifierConfig::new());

    let node = create_node(&store, |n| n.with_property("uuid", 1001_i64)).expect("failed to create");
    assert_eq!(module.reader().find_node_id(&Identifier::Number(1001)).expect("lookup"), node.id);
    assert!(module.reader().find_node_id(&Identifier::from("1001")).is_err());
}

#[test]
fn test_null_identifier_counts_as_absent() {
    let (store, _module) = setup(IdentifierConfig::new());

    let node = create_node(&store, |n| n.with_property("uuid", Value::Null)).expect("create");
    let uuid = identifier(&load_node(&store, node.id), "uuid");
    assert!(uuid.and_then(|u| u.as_text().map(str::len)).is_some_and(|len| len == 36));
}

#[test]
fn test_invalid_identifier_type_rejected() {
    let (store, _module) = setup(IdentifierConfig::new());

    let err = create_node(&store, |n| n.with_property("uuid", true)).expect_err("bool uuid");
    let err = IdentifierError::from_transaction_error(err);
    assert!(matches!(err, IdentifierError::InvalidIdentifier { type_name: "bool", .. }));

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(tx.count_nodes().expect("count"), 0);
}

// ============================================================================
// Generators and Policies
// ============================================================================

#[test]
fn test_hyphens_stripped_from_generated_identifier() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let config = IdentifierConfig::new()
        .strip_hyphens(true)
        .generator(GeneratorKind::Custom("fixed".to_owned()));
    let _module =
        IdentifierModule::register_with_registry(Arc::clone(&store), config, &fixed_registry())
            .expect("failed to register module");

    let node = create_node(&store, |n| n).expect("failed to create node");
    assert_eq!(identifier(&load_node(&store, node.id), "uuid"), Some(Identifier::from("aabbcc")));
}

#[test]
fn test_hyphens_kept_without_stripping() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let config = IdentifierConfig::new().generator(GeneratorKind::Custom("fixed".to_owned()));
    let _module =
        IdentifierModule::register_with_registry(Arc::clone(&store), config, &fixed_registry())
            .expect("failed to register module");

    let node = create_node(&store, |n| n).expect("failed to create node");
    assert_eq!(identifier(&load_node(&store, node.id), "uuid"), Some(Identifier::from("aa-bb-cc")));
}

#[test]
fn test_random_identifiers_stripped() {
    let (store, _module) = setup(IdentifierConfig::new().strip_hyphens(true));

    let node = create_node(&store, |n| n).expect("failed to create node");
    let uuid = identifier(&load_node(&store, node.id), "uuid").expect("uuid");
    let text = uuid.as_text().expect("text");
    assert_eq!(text.len(), 32);
    assert!(!text.contains('-'));
}

#[test]
fn test_sequence_generator_assigns_numbers() {
    let (store, module) =
        setup(IdentifierConfig::new().generator(GeneratorKind::Sequence(Default::default())));

    let first = create_node(&store, |n| n.with_label("Person")).expect("create");
    let second = create_node(&store, |n| n.with_label("Person")).expect("create");

    assert_eq!(identifier(&load_node(&store, first.id), "uuid"), Some(Identifier::Number(1)));
    assert_eq!(identifier(&load_node(&store, second.id), "uuid"), Some(Identifier::Number(2)));
    assert_eq!(module.reader().find_node_id(&Identifier::Number(2)).expect("lookup"), second.id);

    // The counter node never receives an identifier
    let tx = store.begin_read().expect("failed to begin read");
    let counters = tx.find_nodes_by_label("SequenceMetadata").expect("find");
    assert_eq!(counters.len(), 1);
    assert!(load_node(&store, counters[0]).get_property("uuid").is_none());
}

#[test]
fn test_inclusion_policy_limits_assignment() {
    let (store, _module) =
        setup(IdentifierConfig::new().node_inclusion(InclusionPolicy::matching(["Person"])));

    let person = create_node(&store, |n| n.with_label("Person")).expect("create");
    let company = create_node(&store, |n| n.with_label("Company")).expect("create");

    assert!(identifier(&load_node(&store, person.id), "uuid").is_some());
    assert!(identifier(&load_node(&store, company.id), "uuid").is_none());
}

#[test]
fn test_node_gains_identifier_when_it_starts_to_qualify() {
    let (store, module) =
        setup(IdentifierConfig::new().node_inclusion(InclusionPolicy::matching(["Person"])));

    let node = create_node(&store, |n| n.with_label("Candidate")).expect("create");
    assert!(identifier(&load_node(&store, node.id), "uuid").is_none());

    let mut tx = store.begin_write().expect("failed to begin write");
    let mut updated = tx.get_node(node.id).expect("get").expect("exists");
    updated.add_label("Person");
    tx.put_node(&updated).expect("failed to put");
    tx.commit().expect("failed to commit");

    let uuid = identifier(&load_node(&store, node.id), "uuid").expect("uuid after relabel");
    assert_eq!(module.reader().find_node_id(&uuid).expect("lookup"), node.id);
}

#[test]
fn test_custom_inclusion_predicate() {
    let (store, _module) = setup(IdentifierConfig::new().node_inclusion(InclusionPolicy::custom(
        |node: &Entity| node.get_property("tracked") == Some(&Value::Bool(true)),
    )));

    let tracked = create_node(&store, |n| n.with_property("tracked", true)).expect("create");
    let untracked = create_node(&store, |n| n.with_property("tracked", false)).expect("create");

    assert!(identifier(&load_node(&store, tracked.id), "uuid").is_some());
    assert!(identifier(&load_node(&store, untracked.id), "uuid").is_none());
}

// ============================================================================
// Deletion and Lookup
// ============================================================================

#[test]
fn test_deleted_node_leaves_the_index() {
    let (store, module) = setup(IdentifierConfig::new());

    let node = create_node(&store, |n| n).expect("create");
    let uuid = identifier(&load_node(&store, node.id), "uuid").expect("uuid");

    let mut tx = store.begin_write().expect("failed to begin write");
    assert!(tx.delete_node(node.id).expect("failed to delete"));
    tx.commit().expect("failed to commit");

    let err = module.reader().find_node_id(&uuid).expect_err("deleted node must not resolve");
    assert!(err.is_not_found());
    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 0);
}

#[test]
fn test_identifier_reusable_after_delete() {
    let (store, module) = setup(IdentifierConfig::new());

    let first = create_node(&store, |n| n.with_property("uuid", "shared")).expect("create");
    let mut tx = store.begin_write().expect("failed to begin write");
    tx.delete_node(first.id).expect("failed to delete");
    let second = tx.create_node().expect("create").with_property("uuid", "shared");
    tx.put_node(&second).expect("failed to put");
    tx.commit().expect("delete and reuse in one transaction");

    assert_eq!(module.reader().find_node_id(&Identifier::from("shared")).expect("lookup"), second.id);
}

#[test]
fn test_cascade_delete_cleans_relationship_index() {
    let (store, module) = setup(IdentifierConfig::new().relationship_inclusion(InclusionPolicy::All));

    let mut tx = store.begin_write().expect("failed to begin write");
    let a = tx.create_node().expect("create");
    let b = tx.create_node().expect("create");
    tx.put_node(&a).expect("put");
    tx.put_node(&b).expect("put");
    let edge = tx.create_edge(a.id, b.id, "KNOWS").expect("create edge");
    tx.put_edge(&edge).expect("put edge");
    tx.commit().expect("commit");

    let rel_uuid = module
        .reader()
        .identifier_of(edge.id.into())
        .expect("lookup")
        .expect("edge should be indexed");

    let mut tx = store.begin_write().expect("failed to begin write");
    let result = tx.delete_node_cascade(a.id).expect("cascade");
    assert_eq!(result.edges_deleted, vec![edge.id]);
    tx.commit().expect("commit");

    assert!(module.reader().find_relationship_id(&rel_uuid).expect_err("gone").is_not_found());
    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 1);
    assert_eq!(module.index(EntityKind::Relationship).count(&tx).expect("count"), 0);
}

#[test]
fn test_round_trip_for_all_nodes() {
    let (store, module) = setup(IdentifierConfig::new());

    for i in 0..10_i64 {
        create_node(&store, |n| n.with_property("i", i)).expect("create");
    }

    let tx = store.begin_read().expect("failed to begin read");
    let nodes = tx.scan_nodes(None, 100).expect("scan");
    assert_eq!(nodes.len(), 10);
    let identifiers: Vec<_> = nodes.iter().map(|n| identifier(n, "uuid").expect("uuid")).collect();

    let found = module.reader().find_many(EntityKind::Node, &identifiers).expect("find many");
    for (node, entity) in nodes.iter().zip(found) {
        assert_eq!(entity, EntityRef::Node(node.id));
    }

    // One miss fails the whole batch
    let mut with_miss = identifiers[..3].to_vec();
    with_miss.push(Identifier::from("nope"));
    let err = module.reader().find_many(EntityKind::Node, &with_miss).expect_err("miss");
    match err {
        IdentifierError::NotFound { kind, value } => {
            assert_eq!(kind, EntityKind::Node);
            assert_eq!(value, Identifier::from("nope"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_lookup_miss_is_not_found() {
    let (_store, module) = setup(IdentifierConfig::new());

    let err = module.reader().find_node_id(&Identifier::from("missing")).expect_err("miss");
    assert!(matches!(err, IdentifierError::NotFound { kind: EntityKind::Node, .. }));
}
