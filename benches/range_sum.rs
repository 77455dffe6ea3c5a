//! Range-sum workload benchmark: cached vs direct summation.
//!
//! Run with: `cargo bench --bench range_sum`
//!
//! Drives the same seeded hot-pool workload through a [`RangeSumCache`] and
//! through direct slice summation. The cached run pays invalidation scans on
//! every update; the uncached run pays a full slice walk on every query.

mod common;

use common::{generate, random_values, QueryOp, WorkloadSpec};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use memokit::query::RangeSumCache;

const LEN: usize = 8_192;
const OPS: usize = 2_000;
const CAPACITY: usize = 256;
const SEED: u64 = 42;

fn spec() -> WorkloadSpec {
    WorkloadSpec {
        len: LEN,
        ops: OPS,
        hot_pool: 30,
        hot_prob: 0.95,
        update_prob: 0.03,
    }
}

fn run_uncached(values: &mut [i64], ops: &[QueryOp]) -> i64 {
    let mut acc = 0i64;
    for op in ops {
        match *op {
            QueryOp::Range { left, right } => {
                acc = acc.wrapping_add(values[left..=right].iter().sum::<i64>());
            }
            QueryOp::Update { index, value } => values[index] = value,
        }
    }
    acc
}

fn run_cached(values: &mut [i64], ops: &[QueryOp], cache: &mut RangeSumCache<i64>) -> i64 {
    let mut acc = 0i64;
    for op in ops {
        match *op {
            QueryOp::Range { left, right } => {
                acc = acc.wrapping_add(cache.range_sum(values, left, right));
            }
            QueryOp::Update { index, value } => cache.update(values, index, value),
        }
    }
    acc
}

fn bench_uncached(c: &mut Criterion) {
    let ops = generate(spec(), SEED);
    let values = random_values(LEN, SEED);

    c.bench_function("range_sum_uncached", |b| {
        b.iter_batched(
            || values.clone(),
            |mut values| std::hint::black_box(run_uncached(&mut values, &ops)),
            BatchSize::LargeInput,
        )
    });
}

fn bench_cached(c: &mut Criterion) {
    let ops = generate(spec(), SEED);
    let values = random_values(LEN, SEED);

    c.bench_function("range_sum_cached", |b| {
        b.iter_batched(
            || (values.clone(), RangeSumCache::new(CAPACITY)),
            |(mut values, mut cache)| {
                std::hint::black_box(run_cached(&mut values, &ops, &mut cache))
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_invalidation_heavy(c: &mut Criterion) {
    // Update-heavy variant: invalidation scans dominate
    let ops = generate(
        WorkloadSpec {
            update_prob: 0.3,
            ..spec()
        },
        SEED,
    );
    let values = random_values(LEN, SEED);

    c.bench_function("range_sum_cached_update_heavy", |b| {
        b.iter_batched(
            || (values.clone(), RangeSumCache::new(CAPACITY)),
            |(mut values, mut cache)| {
                std::hint::black_box(run_cached(&mut values, &ops, &mut cache))
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_uncached,
    bench_cached,
    bench_invalidation_heavy
);
criterion_main!(benches);
