//! Range-sum caching over a caller-owned backing slice.
//!
//! [`RangeSumCache`] memoizes inclusive range sums keyed by their
//! `(left, right)` endpoints in an [`LruCache`]. The slice itself stays with
//! the caller; the cache only ever sees it as a method argument, so a hit is
//! served without touching the data at all.
//!
//! Correctness under mutation rests entirely on invalidation, not
//! recomputation: a point write at `index` must purge every cached range
//! whose interval contains `index`, because a stale covering entry would
//! answer a later hit with a wrong sum. The purge is a linear scan over the
//! currently cached keys; the cache is capacity-bounded, so the scan is
//! bounded by capacity, not by the slice length.

use std::iter::Sum;

use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::{RangeSumMetrics, RangeSumMetricsSnapshot};
use crate::policy::lru::LruCache;
use crate::traits::MutableCache;

/// LRU-backed cache of inclusive range sums.
///
/// Keys are `(left, right)` endpoint pairs with `left <= right`; overlapping
/// but distinct ranges are cached independently. Bounds validity is the
/// caller's contract: endpoints must index into the slice passed to each
/// call, and out-of-range access panics like any slice indexing.
///
/// # Example
///
/// ```
/// use memokit::query::RangeSumCache;
///
/// let mut values = vec![1i64, 2, 3, 4, 5];
/// let mut cache = RangeSumCache::new(16);
///
/// assert_eq!(cache.range_sum(&values, 1, 3), 9);
/// assert_eq!(cache.range_sum(&values, 1, 3), 9); // served from cache
///
/// // A write inside [1, 3] purges the stale entry.
/// cache.update(&mut values, 2, 30);
/// assert_eq!(cache.range_sum(&values, 1, 3), 36);
/// ```
pub struct RangeSumCache<T> {
    cache: LruCache<(usize, usize), T>,
    #[cfg(feature = "metrics")]
    metrics: RangeSumMetrics,
}

impl<T> RangeSumCache<T>
where
    T: Copy + Sum<T>,
{
    /// Creates a cache that holds up to `capacity` range entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) to handle
    /// invalid configuration without panicking.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a cache that holds up to `capacity` range entries, rejecting
    /// zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            cache: LruCache::try_new(capacity)?,
            #[cfg(feature = "metrics")]
            metrics: RangeSumMetrics::default(),
        })
    }

    /// Returns the sum of `values[left..=right]`, serving repeats from cache.
    ///
    /// A hit returns the cached sum unchanged and promotes the range to
    /// most-recently-used. A miss sums the slice, stores the result under
    /// `(left, right)`, and may evict the least-recently-used range.
    ///
    /// # Panics
    ///
    /// Panics if `left > right` or `right >= values.len()`, as slice
    /// indexing does.
    pub fn range_sum(&mut self, values: &[T], left: usize, right: usize) -> T {
        #[cfg(feature = "metrics")]
        self.metrics.record_sum_call();

        if let Some(&sum) = self.cache.get(&(left, right)) {
            #[cfg(feature = "metrics")]
            self.metrics.record_sum_hit();
            return sum;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_sum_miss();

        let sum = values[left..=right].iter().copied().sum();
        self.cache.insert((left, right), sum);
        sum
    }

    /// Writes `value` at `index` and purges every cached range covering it.
    ///
    /// Ranges not containing `index` are left untouched, including their
    /// recency order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= values.len()`.
    pub fn update(&mut self, values: &mut [T], index: usize, value: T) {
        #[cfg(feature = "metrics")]
        self.metrics.record_update_call();

        values[index] = value;
        self.invalidate_covering(index);
    }

    /// Purges every cached range `(l, r)` with `l <= index <= r`, returning
    /// how many entries were evicted.
    ///
    /// Exposed separately so callers that write to the backing slice
    /// themselves can still keep the cache coherent.
    pub fn invalidate_covering(&mut self, index: usize) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_invalidation_scan(self.cache.len() as u64);

        let stale: Vec<(usize, usize)> = self
            .cache
            .keys()
            .filter(|&&(left, right)| left <= index && index <= right)
            .copied()
            .collect();

        let removed = self.cache.remove_batch(&stale);

        #[cfg(feature = "metrics")]
        self.metrics.record_invalidated(removed as u64);

        removed
    }

    /// Returns `true` if the exact range `(left, right)` is currently cached.
    ///
    /// Does not update recency order.
    pub fn is_cached(&self, left: usize, right: usize) -> bool {
        self.cache.contains(&(left, right))
    }

    /// Returns the number of cached ranges.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if no ranges are cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns the maximum number of cached ranges.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Drops every cached range.
    pub fn clear(&mut self) {
        self.cache.clear()
    }
}

#[cfg(feature = "metrics")]
impl<T> RangeSumCache<T>
where
    T: Copy + Sum<T>,
{
    /// Returns a copy of the operation counters.
    pub fn metrics_snapshot(&self) -> RangeSumMetricsSnapshot {
        self.metrics
            .snapshot(self.cache.len(), self.cache.capacity())
    }
}

impl<T> std::fmt::Debug for RangeSumCache<T>
where
    T: Copy + Sum<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeSumCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_sum(values: &[i64], left: usize, right: usize) -> i64 {
        values[left..=right].iter().sum()
    }

    #[test]
    fn test_miss_then_hit() {
        let values = vec![1i64, 2, 3, 4, 5, 6];
        let mut cache = RangeSumCache::new(8);

        assert_eq!(cache.range_sum(&values, 0, 5), 21);
        assert!(cache.is_cached(0, 5));
        assert_eq!(cache.range_sum(&values, 0, 5), 21);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_single_element_range() {
        let values = vec![10i64, 20, 30];
        let mut cache = RangeSumCache::new(8);

        assert_eq!(cache.range_sum(&values, 1, 1), 20);
        assert!(cache.is_cached(1, 1));
    }

    #[test]
    fn test_overlapping_ranges_tracked_independently() {
        let values = vec![1i64; 10];
        let mut cache = RangeSumCache::new(8);

        assert_eq!(cache.range_sum(&values, 0, 4), 5);
        assert_eq!(cache.range_sum(&values, 2, 6), 5);
        assert_eq!(cache.range_sum(&values, 0, 9), 10);

        assert!(cache.is_cached(0, 4));
        assert!(cache.is_cached(2, 6));
        assert!(cache.is_cached(0, 9));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_update_purges_covering_range() {
        let mut values: Vec<i64> = (0..10).collect();
        let mut cache = RangeSumCache::new(8);

        let before = cache.range_sum(&values, 0, 9);
        assert_eq!(before, 45);

        cache.update(&mut values, 5, 100);
        assert!(!cache.is_cached(0, 9));

        // Must reflect the write, not the stale cached sum
        assert_eq!(cache.range_sum(&values, 0, 9), 45 - 5 + 100);
    }

    #[test]
    fn test_update_leaves_non_covering_range() {
        let mut values = vec![1i64; 30];
        let mut cache = RangeSumCache::new(8);

        cache.range_sum(&values, 10, 20);
        cache.update(&mut values, 5, 7);

        // Index 5 is outside [10, 20]
        assert!(cache.is_cached(10, 20));
        assert_eq!(cache.range_sum(&values, 10, 20), 11);
    }

    #[test]
    fn test_update_purges_all_covering_entries() {
        let mut values = vec![1i64; 20];
        let mut cache = RangeSumCache::new(8);

        cache.range_sum(&values, 0, 10);
        cache.range_sum(&values, 5, 15);
        cache.range_sum(&values, 8, 8);
        cache.range_sum(&values, 12, 19);

        cache.update(&mut values, 8, 2);

        assert!(!cache.is_cached(0, 10));
        assert!(!cache.is_cached(5, 15));
        assert!(!cache.is_cached(8, 8));
        assert!(cache.is_cached(12, 19));
    }

    #[test]
    fn test_invalidate_covering_boundaries() {
        let values = vec![1i64; 20];
        let mut cache = RangeSumCache::new(8);

        cache.range_sum(&values, 3, 7);

        // Endpoints are inclusive on both sides
        assert_eq!(cache.invalidate_covering(3), 1);
        cache.range_sum(&values, 3, 7);
        assert_eq!(cache.invalidate_covering(7), 1);
        cache.range_sum(&values, 3, 7);
        assert_eq!(cache.invalidate_covering(2), 0);
        assert_eq!(cache.invalidate_covering(8), 0);
        assert!(cache.is_cached(3, 7));
    }

    #[test]
    fn test_eviction_respects_capacity() {
        let values = vec![1i64; 100];
        let mut cache = RangeSumCache::new(2);

        cache.range_sum(&values, 0, 1);
        cache.range_sum(&values, 2, 3);
        cache.range_sum(&values, 4, 5);

        assert_eq!(cache.len(), 2);
        assert!(!cache.is_cached(0, 1)); // oldest evicted
        assert!(cache.is_cached(2, 3));
        assert!(cache.is_cached(4, 5));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(RangeSumCache::<i64>::try_new(0).is_err());
        assert!(RangeSumCache::<i64>::try_new(1).is_ok());
    }

    #[test]
    fn test_sums_match_naive_reference() {
        let values: Vec<i64> = (0..50).map(|i| i * 3 - 20).collect();
        let mut cache = RangeSumCache::new(16);

        let ranges = [(0, 49), (0, 0), (49, 49), (10, 30), (10, 30), (25, 26)];
        for &(left, right) in &ranges {
            assert_eq!(
                cache.range_sum(&values, left, right),
                naive_sum(&values, left, right),
            );
        }
    }
}
