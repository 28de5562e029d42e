//! Graph integration tests.
//!
//! Builds small graphs through the services on the in-memory store and
//! checks edge construction and (temporal) traversal end to end.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use tempograph::models::temporal::is_valid_at;
use tempograph::services::DEFAULT_RELATIONSHIP_TYPE;
use tempograph::{
    CollectionType, DepthRange, Direction, Document, Error, InMemoryStore, ManualClock,
    ServiceContainer, TraversalStep,
};

fn services() -> ServiceContainer<InMemoryStore> {
    let clock = Arc::new(ManualClock::at("2024-01-01T00:00:00Z").expect("clock"));
    let services = ServiceContainer::new(Arc::new(InMemoryStore::new())).with_clock(clock);
    let docs = services.documents();
    docs.create_collection("places", CollectionType::Document, false)
        .expect("vertex collection");
    docs.create_collection("roads", CollectionType::Edge, false)
        .expect("edge collection");
    services
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("object")
}

fn add_place(services: &ServiceContainer<InMemoryStore>, key: &str, extra: Value) {
    let mut place = doc(extra);
    place.insert("_key".to_string(), json!(key));
    services.documents().insert("places", place).expect("insert place");
}

fn reached(steps: &[TraversalStep]) -> BTreeSet<String> {
    steps
        .iter()
        .map(|s| s.vertex["_key"].as_str().expect("key").to_string())
        .collect()
}

#[test]
fn test_sequence_of_three_builds_two_ordered_edges() {
    let services = services();
    for key in ["a", "b", "c"] {
        add_place(&services, key, json!({}));
    }
    let items: Vec<String> = ["places/a", "places/b", "places/c"]
        .iter()
        .map(ToString::to_string)
        .collect();

    let written = services
        .graph()
        .create_sequential_relationship("roads", &items, None, Some(&doc(json!({ "lanes": 2 }))))
        .unwrap();
    assert_eq!(written.len(), 2);

    let edges = services.graph().query_edges("roads", None, None).unwrap();
    let shape: Vec<(&str, &str, u64)> = edges
        .iter()
        .map(|e| {
            (
                e["_from"].as_str().unwrap(),
                e["_to"].as_str().unwrap(),
                e["sequence_index"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        shape,
        vec![("places/a", "places/b", 0), ("places/b", "places/c", 1)]
    );
    for edge in &edges {
        assert_eq!(edge["relationship_type"], DEFAULT_RELATIONSHIP_TYPE);
        assert_eq!(edge["lanes"], 2);
        assert_eq!(edge["created_at"], edge["updated_at"]);
        assert!(edge["valid_until"].is_null());
    }
}

#[test]
fn test_short_sequences_create_nothing() {
    let services = services();
    for items in [vec![], vec!["places/a".to_string()]] {
        let result = services
            .graph()
            .create_sequential_relationship("roads", &items, None, None);
        assert!(matches!(result, Err(Error::Validation(_))));
    }
    assert!(services.graph().query_edges("roads", None, None).unwrap().is_empty());
}

#[test]
fn test_traverse_depth_and_direction() {
    let services = services();
    for key in ["a", "b", "c", "d"] {
        add_place(&services, key, json!({}));
    }
    let graph = services.graph();
    graph.create_edge("roads", "places/a", "places/b", None).unwrap();
    graph.create_edge("roads", "places/b", "places/c", None).unwrap();
    graph.create_edge("roads", "places/c", "places/d", None).unwrap();

    let one = graph
        .traverse_graph("places/a", "roads", DepthRange::default(), Direction::Outbound)
        .unwrap();
    assert_eq!(reached(&one), BTreeSet::from(["b".to_string()]));
    assert_eq!(one[0].depth(), 1);
    assert_eq!(one[0].path.len(), 2);
    assert_eq!(one[0].edge["_to"], "places/b");

    let two_three = graph
        .traverse_graph("places/a", "roads", DepthRange::new(2, 3).unwrap(), Direction::Outbound)
        .unwrap();
    assert_eq!(
        reached(&two_three),
        BTreeSet::from(["c".to_string(), "d".to_string()])
    );

    let back = graph
        .traverse_graph("places/d", "roads", DepthRange::new(1, 3).unwrap(), Direction::Inbound)
        .unwrap();
    assert_eq!(back.len(), 3);

    let both = graph
        .traverse_graph("places/b", "roads", DepthRange::exactly(1), Direction::Any)
        .unwrap();
    assert_eq!(
        reached(&both),
        BTreeSet::from(["a".to_string(), "c".to_string()])
    );
}

#[test]
fn test_traverse_cycle_does_not_repeat_edges() {
    let services = services();
    for key in ["a", "b"] {
        add_place(&services, key, json!({}));
    }
    let graph = services.graph();
    graph.create_edge("roads", "places/a", "places/b", None).unwrap();
    graph.create_edge("roads", "places/b", "places/a", None).unwrap();

    let steps = graph
        .traverse_graph("places/a", "roads", DepthRange::new(1, 10).unwrap(), Direction::Outbound)
        .unwrap();
    // a->b, then b->a; no third hop because both edges are used.
    assert_eq!(steps.len(), 2);
    assert_eq!(steps.iter().map(TraversalStep::depth).max(), Some(2));
}

#[test]
fn test_inverted_depth_rejected() {
    assert!(matches!(DepthRange::new(3, 1), Err(Error::Validation(_))));
}

/// Builds:
///
/// ```text
/// a --(open)--> b --(until 2024-03-01)--> c
/// a --(open)--> d   where d is valid from 2024-06-01
/// ```
fn temporal_fixture() -> ServiceContainer<InMemoryStore> {
    let services = services();
    add_place(&services, "a", json!({}));
    add_place(&services, "b", json!({}));
    add_place(&services, "c", json!({}));
    add_place(&services, "d", json!({ "valid_from": "2024-06-01T00:00:00.000000Z" }));

    let graph = services.graph();
    graph.create_edge("roads", "places/a", "places/b", None).unwrap();
    graph
        .create_edge(
            "roads",
            "places/b",
            "places/c",
            Some(&doc(json!({ "valid_until": "2024-03-01T00:00:00.000000Z" }))),
        )
        .unwrap();
    graph.create_edge("roads", "places/a", "places/d", None).unwrap();
    services
}

fn at(services: &ServiceContainer<InMemoryStore>, timestamp: &str) -> Vec<TraversalStep> {
    services
        .graph()
        .temporal_traverse(
            "places/a",
            "roads",
            timestamp,
            DepthRange::new(1, 3).unwrap(),
            Direction::Outbound,
        )
        .unwrap()
}

#[test]
fn test_temporal_traverse_snapshots() {
    let services = temporal_fixture();

    let feb = at(&services, "2024-02-01T00:00:00.000000Z");
    assert_eq!(reached(&feb), BTreeSet::from(["b".to_string(), "c".to_string()]));

    let apr = at(&services, "2024-04-01T00:00:00.000000Z");
    assert_eq!(reached(&apr), BTreeSet::from(["b".to_string()]));

    let jul = at(&services, "2024-07-01T00:00:00.000000Z");
    assert_eq!(reached(&jul), BTreeSet::from(["b".to_string(), "d".to_string()]));

    // The unfiltered walk sees everything.
    let all = services
        .graph()
        .traverse_graph("places/a", "roads", DepthRange::new(1, 3).unwrap(), Direction::Outbound)
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_temporal_traverse_never_returns_invalid_elements() {
    let services = temporal_fixture();
    for ts in [
        "2023-12-31T00:00:00.000000Z",
        "2024-01-01T00:00:00.000000Z",
        "2024-03-01T00:00:00.000000Z",
        "2024-03-01T00:00:00.000001Z",
        "2024-06-01T00:00:00.000000Z",
        "2025-01-01T00:00:00.000000Z",
    ] {
        for step in at(&services, ts) {
            assert!(is_valid_at(&step.vertex, ts), "vertex at {ts}");
            assert!(is_valid_at(&step.edge, ts), "edge at {ts}");
            assert!(step.path.iter().all(|v| is_valid_at(v, ts)), "path at {ts}");
        }
    }
}

#[test]
fn test_temporal_traverse_inclusive_edge_bound() {
    let services = temporal_fixture();
    let exact = at(&services, "2024-03-01T00:00:00.000000Z");
    assert!(reached(&exact).contains("c"));
    let after = at(&services, "2024-03-01T00:00:00.000001Z");
    assert!(!reached(&after).contains("c"));
}

#[test]
fn test_temporal_traverse_invalid_start_returns_nothing() {
    let services = temporal_fixture();
    let before_creation = at(&services, "2023-06-01T00:00:00.000000Z");
    assert!(before_creation.is_empty());
}
