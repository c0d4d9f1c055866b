//! Serialization round trips, run with `--features serde`

#![cfg(feature = "serde")]

use binary_priority_queue::{Entry, Heap};

#[test]
fn test_entry_round_trip() {
    let entry = Entry::new("job".to_string(), 7u32);
    let json = serde_json::to_string(&entry).unwrap();
    assert_eq!(json, r#"{"value":"job","priority":7}"#);

    let back: Entry<String, u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_heap_serializes_in_storage_order() {
    let heap = Heap::from_pairs([("x", 2u32), ("y", 5), ("z", 1)]);
    let json = serde_json::to_string(&heap).unwrap();
    assert_eq!(
        json,
        r#"[{"value":"y","priority":5},{"value":"x","priority":2},{"value":"z","priority":1}]"#
    );

    let back: Heap<String, u32> = serde_json::from_str(&json).unwrap();
    let layout: Vec<_> = back.iter().map(|e| (e.value.as_str(), e.priority)).collect();
    assert_eq!(layout, vec![("y", 5), ("x", 2), ("z", 1)]);
}

#[test]
fn test_deserialize_restores_invariant() {
    // Ascending order is not a valid max-heap layout.
    let json = r#"[
        {"value":"a","priority":1},
        {"value":"b","priority":2},
        {"value":"c","priority":3}
    ]"#;
    let mut heap: Heap<String, u32> = serde_json::from_str(json).unwrap();

    assert_eq!(heap.len(), 3);
    assert_eq!(heap.dequeue().unwrap().value, "c");
    assert_eq!(heap.dequeue().unwrap().value, "b");
    assert_eq!(heap.dequeue().unwrap().value, "a");
}

#[test]
fn test_deserialize_rejects_malformed_entries() {
    let result: Result<Heap<String, u32>, _> = serde_json::from_str(r#"[{"value":"a"}]"#);
    assert!(result.is_err());
}
