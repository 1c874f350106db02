use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use devbot::store::{MatchPolicy, QaEntry, Store};

const TOPICS: &[&str] = &[
    "rust", "tokio", "axum", "serde", "borrow checker", "lifetimes", "traits", "macros",
    "cargo", "closures",
];

fn build_store(size: usize) -> Store {
    let entries = (0..size)
        .map(|i| {
            let topic = TOPICS[i % TOPICS.len()];
            QaEntry::new(
                format!("how do i use {} in project number {}", topic, i),
                format!("answer {}", i),
            )
        })
        .collect();
    Store::from_entries(entries)
}

fn bench_find_match(c: &mut Criterion) {
    let store = build_store(500);
    let policy = MatchPolicy::default();

    c.bench_function("find_match_miss_500", |b| {
        b.iter(|| store.find_match(black_box("what is the capital of france"), &policy))
    });

    c.bench_function("find_match_hit_500", |b| {
        b.iter(|| store.find_match(black_box("how do i use tokio in project number 251"), &policy))
    });
}

criterion_group!(benches, bench_find_match);
criterion_main!(benches);
