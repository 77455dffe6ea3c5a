//! Memoized Fibonacci over pluggable memo stores.
//!
//! The recursion is identical regardless of which container backs the memo:
//! check the store before recomputing, record base cases and combined
//! results as they are produced. What differs between runs is only the
//! container's internal behavior: a hash map stays flat, an
//! [`LruCache`](crate::policy::lru::LruCache) bounds its footprint, a
//! [`SplayTree`](crate::tree::splay::SplayTree) keeps the most recent keys
//! near its root.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::traits::MemoStore;

/// Largest `n` for which the Fibonacci number fits in `u128`.
pub const MAX_FIB_N: u64 = 186;

/// Simple unbounded memo: a hash map records everything, overwrites are
/// harmless because memoization writes each key once.
impl<K, V> MemoStore<K, V> for FxHashMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    #[inline]
    fn lookup(&mut self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    #[inline]
    fn record(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

/// Computes the `n`-th Fibonacci number, memoizing through `memo`.
///
/// The store is checked before every recomputation; base cases (`n <= 1`)
/// are recorded too, so a warm store answers any revisit without recursing.
/// Passing the same store across calls reuses all previously recorded
/// results.
///
/// # Panics
///
/// Panics if `n > MAX_FIB_N`; larger values do not fit in `u128`.
///
/// # Example
///
/// ```
/// use memokit::memo::fibonacci;
/// use memokit::tree::splay::SplayTree;
/// use rustc_hash::FxHashMap;
///
/// let mut map_memo: FxHashMap<u64, u128> = FxHashMap::default();
/// let mut tree_memo: SplayTree<u64, u128> = SplayTree::new();
///
/// assert_eq!(fibonacci(10, &mut map_memo), 55);
/// assert_eq!(fibonacci(10, &mut tree_memo), 55);
/// ```
pub fn fibonacci<M>(n: u64, memo: &mut M) -> u128
where
    M: MemoStore<u64, u128>,
{
    assert!(
        n <= MAX_FIB_N,
        "fibonacci({n}) does not fit in u128 (max n is {MAX_FIB_N})"
    );
    fib_memoized(n, memo)
}

fn fib_memoized<M>(n: u64, memo: &mut M) -> u128
where
    M: MemoStore<u64, u128>,
{
    if let Some(value) = memo.lookup(&n) {
        return value;
    }
    if n <= 1 {
        memo.record(n, u128::from(n));
        return u128::from(n);
    }
    let value = fib_memoized(n - 1, memo) + fib_memoized(n - 2, memo);
    memo.record(n, value);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::lru::LruCache;
    use crate::tree::splay::SplayTree;

    /// Iterative reference, no memo involved. Never computes past `fib(n)`,
    /// so it is exact up to `MAX_FIB_N`.
    fn fib_reference(n: u64) -> u128 {
        if n == 0 {
            return 0;
        }
        let (mut a, mut b) = (0u128, 1u128);
        for _ in 1..n {
            let next = a + b;
            a = b;
            b = next;
        }
        b
    }

    #[test]
    fn test_small_values_hash_memo() {
        let mut memo: FxHashMap<u64, u128> = FxHashMap::default();

        assert_eq!(fibonacci(0, &mut memo), 0);
        assert_eq!(fibonacci(1, &mut memo), 1);
        assert_eq!(fibonacci(2, &mut memo), 1);
        assert_eq!(fibonacci(10, &mut memo), 55);
        assert_eq!(fibonacci(30, &mut memo), 832_040);
    }

    #[test]
    fn test_splay_memo_matches_reference() {
        let mut memo: SplayTree<u64, u128> = SplayTree::new();

        for n in 0..=40 {
            assert_eq!(fibonacci(n, &mut memo), fib_reference(n));
        }
        memo.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_memo_matches_reference() {
        // Capacity covers the whole key space, so nothing is ever recomputed
        // incorrectly even with eviction enabled.
        let mut memo: LruCache<u64, u128> = LruCache::new(256);

        for n in [5, 20, 40, 60, 60, 5] {
            assert_eq!(fibonacci(n, &mut memo), fib_reference(n));
        }
    }

    #[test]
    fn test_warm_store_is_reused() {
        let mut memo: SplayTree<u64, u128> = SplayTree::new();

        fibonacci(50, &mut memo);
        let len_after_first = memo.len();

        // A smaller query hits the warm store without growing it
        fibonacci(30, &mut memo);
        assert_eq!(memo.len(), len_after_first);
    }

    #[test]
    fn test_max_fib_n_fits() {
        let mut memo: FxHashMap<u64, u128> = FxHashMap::default();
        let value = fibonacci(MAX_FIB_N, &mut memo);
        assert_eq!(value, fib_reference(MAX_FIB_N));
    }

    #[test]
    #[should_panic(expected = "does not fit in u128")]
    fn test_overflowing_n_panics() {
        let mut memo: FxHashMap<u64, u128> = FxHashMap::default();
        fibonacci(MAX_FIB_N + 1, &mut memo);
    }

    #[test]
    fn test_base_cases_are_recorded() {
        let mut memo: SplayTree<u64, u128> = SplayTree::new();

        fibonacci(1, &mut memo);
        assert_eq!(memo.search(&1), Some(&1));

        fibonacci(5, &mut memo);
        assert_eq!(memo.search(&0), Some(&0));
    }
}
