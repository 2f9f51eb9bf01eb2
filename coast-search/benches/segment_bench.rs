//! Benchmarks for segment generation and deduplication.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use coast_search::dimensions::Dimension;
use coast_search::results::{deduplicate, LinkCollection, LinkItem};
use coast_search::segments::{generate, DimensionClauses};

fn clauses(n: usize) -> Vec<DimensionClauses> {
    (0..n)
        .map(|i| {
            let dimension = Dimension::new(
                format!("dim{i}"),
                (0..4).map(|w| format!("word{i}x{w}")),
            );
            DimensionClauses::from_dimension(&dimension)
        })
        .collect()
}

fn generate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for n in [3, 6, 10] {
        let input = clauses(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| generate(black_box(input), "software", "annexs mug regions"));
        });
    }
    group.finish();
}

fn dedup_benchmark(c: &mut Criterion) {
    let collection = LinkCollection {
        results: (0..3)
            .map(|run| {
                (0..9)
                    .map(|segment| {
                        LinkItem::new(
                            segment,
                            (0..10).map(|rank| format!("https://example.com/{}/{rank}", (segment + run) % 5)),
                        )
                    })
                    .collect()
            })
            .collect(),
    };

    c.bench_function("deduplicate_27_items", |b| {
        b.iter(|| deduplicate(black_box(&collection)));
    });
}

criterion_group!(benches, generate_benchmark, dedup_benchmark);
criterion_main!(benches);
