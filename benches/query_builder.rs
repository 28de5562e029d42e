//! Benchmarks for AQL construction and in-memory evaluation.
//!
//! Query building should stay well under a microsecond; it runs on every
//! service call before the store is touched.

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use tempograph::query::QueryBuilder;
use tempograph::{
    CollectionType, DepthRange, Direction, DocumentId, FieldPath, Identifier, InMemoryStore,
    ManualClock, ServiceContainer, TimeInterval,
};

/// Benchmarks building each query shape.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_build");
    group.measurement_time(Duration::from_secs(3));

    let edges = Identifier::parse("follows").unwrap();
    let people = Identifier::parse("people").unwrap();
    let start = DocumentId::parse("people/alice").unwrap();
    let field = FieldPath::parse("created_at").unwrap();
    let grouping = FieldPath::parse("meta.kind").unwrap();

    group.bench_function("identifier_parse", |b| {
        b.iter(|| Identifier::parse(black_box("people_2024")));
    });
    group.bench_function("traverse", |b| {
        b.iter(|| {
            QueryBuilder::traverse(
                black_box(&start),
                &edges,
                DepthRange::new(1, 3).unwrap(),
                Direction::Outbound,
            )
        });
    });
    group.bench_function("temporal_traverse", |b| {
        b.iter(|| {
            QueryBuilder::temporal_traverse(
                black_box(&start),
                &edges,
                "2024-01-01T00:00:00.000000Z",
                DepthRange::new(1, 3).unwrap(),
                Direction::Any,
            )
        });
    });
    group.bench_function("valid_at", |b| {
        b.iter(|| QueryBuilder::valid_at(black_box(&people), "2024-01-01T00:00:00.000000Z"));
    });
    for interval in [TimeInterval::Day, TimeInterval::Week] {
        group.bench_with_input(
            BenchmarkId::new("time_series_grouped", interval),
            &interval,
            |b, &interval| {
                b.iter(|| QueryBuilder::time_series(&people, &field, interval, Some(&grouping)));
            },
        );
    }

    group.finish();
}

/// Benchmarks temporal traversal over in-memory chains of growing length.
fn bench_memory_traverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_temporal_traverse");
    group.measurement_time(Duration::from_secs(3));

    for len in [10usize, 100] {
        let clock = Arc::new(ManualClock::at("2024-01-01T00:00:00Z").unwrap());
        let services = ServiceContainer::new(Arc::new(InMemoryStore::new())).with_clock(clock);
        let docs = services.documents();
        docs.create_collection("steps", CollectionType::Document, false).unwrap();
        docs.create_collection("next", CollectionType::Edge, false).unwrap();
        let items: Vec<String> = (0..len)
            .map(|i| {
                let mut step = tempograph::Document::new();
                step.insert("_key".to_string(), format!("s{i}").into());
                docs.insert("steps", step).unwrap().id
            })
            .collect();
        services
            .graph()
            .create_sequential_relationship("next", &items, None, None)
            .unwrap();
        let max = u32::try_from(len).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                services
                    .graph()
                    .temporal_traverse(
                        "steps/s0",
                        "next",
                        "2024-06-01T00:00:00Z",
                        DepthRange::new(1, max).unwrap(),
                        Direction::Outbound,
                    )
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_memory_traverse);
criterion_main!(benches);
