//! Record cache integration tests.
//!
//! Exercises get-or-create under contention: identical signatures requested
//! from many threads must synthesize exactly one record type.

use dynex_types::{DynamicProperty, PropertySignature, RecordCache, Type};
use std::sync::{Arc, Barrier};

/// Helper: build a signature from `(name, type)` pairs.
fn signature(props: &[(&str, Type)]) -> PropertySignature {
    props.iter().map(|(n, t)| DynamicProperty::new(*n, t.clone())).collect()
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_identical_requests_share_one_instance() {
    const THREADS: usize = 15;
    let cache = RecordCache::new();
    let barrier = Barrier::new(THREADS);

    let records: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache
                        .get_or_create(signature(&[("Id", Type::INT32), ("Name", Type::STRING)]))
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(records.len(), THREADS);
    for record in &records[1..] {
        assert!(Arc::ptr_eq(&records[0], record));
    }
    assert_eq!(cache.synthesized_count(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_concurrent_distinct_requests() {
    const THREADS: usize = 8;
    let cache = RecordCache::new();
    let barrier = Barrier::new(THREADS);

    std::thread::scope(|s| {
        for i in 0..THREADS {
            let cache = &cache;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                let name = format!("Field{}", i);
                let a = cache.get_or_create(signature(&[(name.as_str(), Type::INT32)])).unwrap();
                let b = cache.get_or_create(signature(&[(name.as_str(), Type::INT32)])).unwrap();
                assert!(Arc::ptr_eq(&a, &b));
            });
        }
    });

    assert_eq!(cache.len(), THREADS);
    assert_eq!(cache.synthesized_count(), THREADS);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[test]
fn test_failed_signature_can_be_retried_after_fix() {
    let cache = RecordCache::new();
    assert!(cache.get_or_create(signature(&[("bad name", Type::INT32)])).is_err());
    assert!(cache.is_empty());
    let record = cache.get_or_create(signature(&[("good_name", Type::INT32)])).unwrap();
    assert_eq!(record.properties()[0].name, "good_name");
}

#[test]
fn test_record_type_identity_through_type() {
    let cache = RecordCache::new();
    let a = Type::record(cache.get_or_create(signature(&[("A", Type::INT32)])).unwrap());
    let b = Type::record(cache.get_or_create(signature(&[("A", Type::INT32)])).unwrap());
    let c = Type::record(cache.get_or_create(signature(&[("B", Type::INT32)])).unwrap());
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.member("A").map(|m| m.ty), Some(Type::INT32));
}
