//! Concurrent generation and commits.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use graphuid::{
    EntityKind, GeneratorKind, Identifier, IdentifierConfig, IdentifierError, IdentifierGenerator,
    SequenceConfig, SequenceGenerator,
};
use graphuid_graph::GraphStore;
use parking_lot::Mutex;

use super::{identifier, load_node, setup};

const THREADS: usize = 8;
const PER_THREAD: usize = 25;

#[test]
fn test_concurrent_sequence_callers_get_distinct_increasing_values() {
    let store = Arc::new(GraphStore::in_memory().expect("failed to create store"));
    let generator = Arc::new(SequenceGenerator::new(SequenceConfig::new()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            let generator = Arc::clone(&generator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|_| {
                        generator
                            .generate(&store)
                            .expect("generation failed")
                            .as_number()
                            .expect("sequence values are numbers")
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        let values = handle.join().expect("thread panicked");
        assert!(values.windows(2).all(|w| w[0] < w[1]), "values per caller must increase");
        for value in values {
            assert!(all.insert(value), "duplicate value {value}");
        }
    }

    let total = i64::try_from(THREADS * PER_THREAD).expect("small count");
    assert_eq!(all.len(), THREADS * PER_THREAD);
    assert_eq!(all.iter().copied().max(), Some(total), "no updates were lost");

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(tx.find_nodes_by_label("SequenceMetadata").expect("find").len(), 1);
}

#[test]
fn test_concurrent_creates_with_sequence_module() {
    let (store, module) =
        setup(IdentifierConfig::new().generator(GeneratorKind::Sequence(SequenceConfig::new())));
    let created = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let created = Arc::clone(&created);
            thread::spawn(move || {
                for _ in 0..10 {
                    let mut tx = store.begin_write().expect("failed to begin write");
                    let node = tx.create_node().expect("create").with_label("Item");
                    tx.put_node(&node).expect("put");
                    tx.commit().expect("commit");
                    created.lock().push(node.id);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let ids = created.lock().clone();
    let values: HashSet<_> =
        ids.iter().map(|id| identifier(&load_node(&store, *id), "uuid").expect("uuid")).collect();
    assert_eq!(values.len(), 40);
    assert_eq!(values, (1..=40).map(Identifier::Number).collect());

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 40);
}

#[test]
fn test_concurrent_duplicate_preassigned_identifier() {
    let (store, module) = setup(IdentifierConfig::new());

    let mut first = store.begin_write().expect("failed to begin write");
    let mut second = store.begin_write().expect("failed to begin write");

    let a = first.create_node().expect("create").with_property("uuid", "dup");
    let b = second.create_node().expect("create").with_property("uuid", "dup");
    first.put_node(&a).expect("put");
    second.put_node(&b).expect("put");

    first.commit().expect("first committer wins");
    let err = IdentifierError::from_transaction_error(second.commit().expect_err("second loses"));
    assert!(err.is_conflict(), "expected a conflict, got {err}");

    assert_eq!(module.reader().find_node_id(&Identifier::from("dup")).expect("lookup"), a.id);
    let tx = store.begin_read().expect("failed to begin read");
    assert!(tx.get_node(b.id).expect("get").is_none());
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 1);
}

#[test]
fn test_concurrent_random_assignment() {
    let (store, module) = setup(IdentifierConfig::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..25 {
                    let mut tx = store.begin_write().expect("failed to begin write");
                    let node = tx.create_node().expect("create");
                    tx.put_node(&node).expect("put");
                    tx.commit().expect("commit");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let tx = store.begin_read().expect("failed to begin read");
    assert_eq!(tx.count_nodes().expect("count"), 100);
    assert_eq!(module.index(EntityKind::Node).count(&tx).expect("count"), 100);
}
