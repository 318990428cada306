//! Index and reconciliation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nextdate::{
    build_index, computed_source, next_date_for, reconcile, summarize, CalendarResult, DateKey,
    SourceTag, TestCase,
};

/// Three overlapping sources over `keys` distinct dates; one in seven answers is wrong.
fn generate_cases(keys: usize) -> Vec<TestCase> {
    let dates: Vec<DateKey> = (0..keys)
        .map(|i| DateKey::new((i % 28 + 1) as i64, (i / 28 % 12 + 1) as i64, 1900 + (i / 336) as i64))
        .collect();

    let mut cases = Vec::with_capacity(keys * 2);
    for (source_idx, name) in ["boundary-suite", "comprehensive-suite", "generated-suite"]
        .iter()
        .enumerate()
    {
        for (i, key) in dates.iter().enumerate() {
            if (i + source_idx) % 3 == 0 {
                continue;
            }
            let expected = if (i + source_idx) % 7 == 0 {
                CalendarResult::Valid(*key)
            } else {
                next_date_for(key)
            };
            cases.push(TestCase::new(*key, expected, SourceTag::new(*name)));
        }
    }
    cases
}

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");

    for keys in [1_000, 10_000].iter() {
        let cases = generate_cases(*keys);
        group.throughput(Throughput::Elements(cases.len() as u64));
        group.bench_with_input(BenchmarkId::new("keys", keys), &cases, |b, cases| {
            b.iter(|| build_index(black_box(cases.clone())))
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for keys in [1_000, 10_000].iter() {
        let mut cases = generate_cases(*keys);
        let computed = computed_source(cases.iter().map(|c| &c.key));
        cases.extend(computed);
        let split = build_index(cases).index.split_by_source();

        group.throughput(Throughput::Elements(*keys as u64));
        group.bench_with_input(BenchmarkId::new("keys", keys), &split, |b, split| {
            b.iter(|| summarize(&reconcile(black_box(split))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_index, bench_reconcile);
criterion_main!(benches);
