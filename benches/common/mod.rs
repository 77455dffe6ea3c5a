//! Shared workload generation for the memokit benches.
//!
//! Models a read-heavy range-query stream: most queries hit a small hot pool
//! of wide ranges, a few explore random ranges, and a sparse fraction are
//! point updates that force invalidation.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
pub enum QueryOp {
    Range { left: usize, right: usize },
    Update { index: usize, value: i64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    /// Backing slice length.
    pub len: usize,
    /// Number of operations to generate.
    pub ops: usize,
    /// Size of the hot range pool.
    pub hot_pool: usize,
    /// Probability a range query is drawn from the hot pool.
    pub hot_prob: f64,
    /// Probability an operation is a point update.
    pub update_prob: f64,
}

pub fn generate(spec: WorkloadSpec, seed: u64) -> Vec<QueryOp> {
    let mut rng = SmallRng::seed_from_u64(seed);

    let hot: Vec<(usize, usize)> = (0..spec.hot_pool)
        .map(|_| {
            let left = rng.gen_range(0..spec.len / 2);
            let right = rng.gen_range(spec.len / 2..spec.len);
            (left, right)
        })
        .collect();

    (0..spec.ops)
        .map(|_| {
            if rng.gen_bool(spec.update_prob) {
                QueryOp::Update {
                    index: rng.gen_range(0..spec.len),
                    value: rng.gen_range(1..=100),
                }
            } else if rng.gen_bool(spec.hot_prob) {
                let (left, right) = hot[rng.gen_range(0..hot.len())];
                QueryOp::Range { left, right }
            } else {
                let left = rng.gen_range(0..spec.len);
                let right = rng.gen_range(left..spec.len);
                QueryOp::Range { left, right }
            }
        })
        .collect()
}

pub fn random_values(len: usize, seed: u64) -> Vec<i64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(1..=100)).collect()
}
