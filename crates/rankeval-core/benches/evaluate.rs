use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rankeval_core::RankingEvaluator;
use rankeval_core::ranking::{Ranking, RankingBatch};

/// Deterministic pseudo-shuffled rankings so candidate and reference overlap
/// partially, as they do against a real search engine.
fn synthetic_batches(queries: usize) -> (RankingBatch, RankingBatch) {
    let reference = (0..queries)
        .map(|q| {
            let ranking: Ranking = (0..20).map(|d| format!("doc-{q}-{d}")).collect();
            (format!("query {q}"), ranking)
        })
        .collect();
    let candidate = (0..queries)
        .map(|q| {
            let ranking: Ranking = (0..20)
                .map(|d| format!("doc-{q}-{}", (d * 7 + q) % 30))
                .collect();
            (format!("query {q}"), ranking)
        })
        .collect();
    (reference, candidate)
}

fn bench_evaluate_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_batch");
    let evaluator = RankingEvaluator::default();

    for queries in [100, 1_000, 10_000] {
        let (reference, candidate) = synthetic_batches(queries);
        group.bench_with_input(
            BenchmarkId::from_parameter(queries),
            &(reference, candidate),
            |b, (reference, candidate)| {
                b.iter(|| black_box(evaluator.evaluate_batch(reference, candidate)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate_batch);
criterion_main!(benches);
