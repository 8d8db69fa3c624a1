use super::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn minted_ids_are_transient() {
    let allocator = IdAllocator::new(7);
    let id = allocator.mint().unwrap();

    assert!(id.is_transient());
    assert!(!id.is_zero());
}

#[test]
fn strip_transient_preserves_entity_id() {
    let allocator = IdAllocator::new(42);
    let id = allocator.mint().unwrap();

    let stripped = id.strip_transient();
    assert!(!stripped.is_transient());
    assert_eq!(stripped.entity_id(), 42);
    assert_eq!(id.entity_id(), 42);
    assert_eq!(stripped.counter(), id.counter());
}

#[test]
fn transient_and_persisted_ranges_are_disjoint() {
    let allocator = IdAllocator::new(1);
    let id = allocator.mint().unwrap();

    assert!(id.raw() >= Oid::TRANSIENT_BIT);
    assert!(id.strip_transient().raw() < Oid::TRANSIENT_BIT);
}

#[test]
fn sequential_mints_never_repeat() {
    let allocator = IdAllocator::new(3);
    let mut seen = HashSet::new();

    // Crosses several block boundaries.
    for _ in 0..(ID_BLOCK * 3 + 10) {
        let id = allocator.mint().unwrap();
        assert!(seen.insert(id.strip_transient().raw()), "duplicate id {id}");
        assert_eq!(id.entity_id(), 3);
    }
}

#[test]
fn counter_zero_is_never_minted() {
    let allocator = IdAllocator::new(9);
    let first = allocator.mint().unwrap();
    assert_eq!(first.counter(), 1);
}

#[test]
fn concurrent_generators_stay_disjoint() {
    let allocator = Arc::new(IdAllocator::new(5));
    let mut handles = Vec::new();

    for _ in 0..4 {
        let allocator = Arc::clone(&allocator);
        handles.push(thread::spawn(move || {
            let mut generator = allocator.generator();
            let mut local = Vec::new();
            for _ in 0..(ID_BLOCK * 2) {
                local.push(generator.mint().unwrap().raw());
            }
            local
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        for raw in handle.join().unwrap() {
            assert!(seen.insert(raw), "duplicate id raw value {raw}");
        }
    }

    assert_eq!(seen.len(), (ID_BLOCK * 2 * 4) as usize);
}

#[test]
fn display_round_trips_through_from_str() {
    let allocator = IdAllocator::new(12);
    let transient = allocator.mint().unwrap();
    let persisted = transient.strip_transient();

    let reparsed: Oid = transient.to_string().parse().unwrap();
    assert_eq!(reparsed, transient);

    let reparsed: Oid = persisted.to_string().parse().unwrap();
    assert_eq!(reparsed, persisted);
}

#[test]
fn from_str_rejects_garbage() {
    assert!("".parse::<Oid>().is_err());
    assert!("Txyz".parse::<Oid>().is_err());
    assert!("12x".parse::<Oid>().is_err());
}

#[test]
fn zero_reads_as_unassigned() {
    assert!(Oid::ZERO.is_zero());
    assert!(!Oid::ZERO.is_transient());
    assert_eq!(Oid::ZERO.entity_id(), 0);
}
