//! Operation counters for the `metrics` feature.
//!
//! Each structure owns its counter block and records inline under
//! `#[cfg(feature = "metrics")]`; snapshots are plain `Copy` structs that
//! add the gauges (current length, capacity) captured at snapshot time.
//! Recording is plain `u64` increments; the structures are single-threaded,
//! so no atomics are involved.

// ---------------------------------------------------------------------------
// LRU cache
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LruMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evicted_entries: u64,
    pub pop_lru_calls: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
}

impl LruMetrics {
    #[inline]
    pub fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    #[inline]
    pub fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    #[inline]
    pub fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    #[inline]
    pub fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    pub fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    pub fn record_eviction(&mut self) {
        self.evicted_entries += 1;
    }

    #[inline]
    pub fn record_pop_lru_call(&mut self) {
        self.pop_lru_calls += 1;
    }

    #[inline]
    pub fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    #[inline]
    pub fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }

    #[inline]
    pub fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    #[inline]
    pub fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_updates: self.insert_updates,
            insert_new: self.insert_new,
            evicted_entries: self.evicted_entries,
            pop_lru_calls: self.pop_lru_calls,
            touch_calls: self.touch_calls,
            touch_found: self.touch_found,
            remove_calls: self.remove_calls,
            remove_found: self.remove_found,
            cache_len,
            capacity,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evicted_entries: u64,
    pub pop_lru_calls: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
    pub remove_calls: u64,
    pub remove_found: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

// ---------------------------------------------------------------------------
// Splay tree
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SplayMetrics {
    pub search_calls: u64,
    pub search_hits: u64,
    pub search_misses: u64,
    pub insert_calls: u64,
    pub insert_created: u64,
    pub insert_existing: u64,
}

impl SplayMetrics {
    #[inline]
    pub fn record_search_call(&mut self) {
        self.search_calls += 1;
    }

    #[inline]
    pub fn record_search_hit(&mut self) {
        self.search_hits += 1;
    }

    #[inline]
    pub fn record_search_miss(&mut self) {
        self.search_misses += 1;
    }

    #[inline]
    pub fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    #[inline]
    pub fn record_insert_created(&mut self) {
        self.insert_created += 1;
    }

    #[inline]
    pub fn record_insert_existing(&mut self) {
        self.insert_existing += 1;
    }

    pub fn snapshot(&self, tree_len: usize) -> SplayMetricsSnapshot {
        SplayMetricsSnapshot {
            search_calls: self.search_calls,
            search_hits: self.search_hits,
            search_misses: self.search_misses,
            insert_calls: self.insert_calls,
            insert_created: self.insert_created,
            insert_existing: self.insert_existing,
            tree_len,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SplayMetricsSnapshot {
    pub search_calls: u64,
    pub search_hits: u64,
    pub search_misses: u64,

    pub insert_calls: u64,
    pub insert_created: u64,
    pub insert_existing: u64,

    // gauge captured at snapshot time
    pub tree_len: usize,
}

// ---------------------------------------------------------------------------
// Range-sum cache
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RangeSumMetrics {
    pub sum_calls: u64,
    pub sum_hits: u64,
    pub sum_misses: u64,
    pub update_calls: u64,
    pub invalidation_scans: u64,
    pub scanned_keys: u64,
    pub invalidated_entries: u64,
}

impl RangeSumMetrics {
    #[inline]
    pub fn record_sum_call(&mut self) {
        self.sum_calls += 1;
    }

    #[inline]
    pub fn record_sum_hit(&mut self) {
        self.sum_hits += 1;
    }

    #[inline]
    pub fn record_sum_miss(&mut self) {
        self.sum_misses += 1;
    }

    #[inline]
    pub fn record_update_call(&mut self) {
        self.update_calls += 1;
    }

    #[inline]
    pub fn record_invalidation_scan(&mut self, scanned: u64) {
        self.invalidation_scans += 1;
        self.scanned_keys += scanned;
    }

    #[inline]
    pub fn record_invalidated(&mut self, entries: u64) {
        self.invalidated_entries += entries;
    }

    pub fn snapshot(&self, cached_ranges: usize, capacity: usize) -> RangeSumMetricsSnapshot {
        RangeSumMetricsSnapshot {
            sum_calls: self.sum_calls,
            sum_hits: self.sum_hits,
            sum_misses: self.sum_misses,
            update_calls: self.update_calls,
            invalidation_scans: self.invalidation_scans,
            scanned_keys: self.scanned_keys,
            invalidated_entries: self.invalidated_entries,
            cached_ranges,
            capacity,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RangeSumMetricsSnapshot {
    pub sum_calls: u64,
    pub sum_hits: u64,
    pub sum_misses: u64,

    pub update_calls: u64,
    pub invalidation_scans: u64,
    pub scanned_keys: u64,
    pub invalidated_entries: u64,

    // gauges captured at snapshot time
    pub cached_ranges: usize,
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_snapshot_carries_counters_and_gauges() {
        let mut metrics = LruMetrics::default();
        metrics.record_get_hit();
        metrics.record_get_miss();
        metrics.record_insert_call();
        metrics.record_insert_new();

        let snap = metrics.snapshot(3, 10);
        assert_eq!(snap.get_calls, 2);
        assert_eq!(snap.get_hits, 1);
        assert_eq!(snap.get_misses, 1);
        assert_eq!(snap.insert_new, 1);
        assert_eq!(snap.cache_len, 3);
        assert_eq!(snap.capacity, 10);
    }

    #[test]
    fn splay_snapshot_distinguishes_created_and_existing() {
        let mut metrics = SplayMetrics::default();
        metrics.record_insert_call();
        metrics.record_insert_created();
        metrics.record_insert_call();
        metrics.record_insert_existing();

        let snap = metrics.snapshot(1);
        assert_eq!(snap.insert_calls, 2);
        assert_eq!(snap.insert_created, 1);
        assert_eq!(snap.insert_existing, 1);
        assert_eq!(snap.tree_len, 1);
    }

    #[test]
    fn range_sum_snapshot_accumulates_scan_sizes() {
        let mut metrics = RangeSumMetrics::default();
        metrics.record_invalidation_scan(4);
        metrics.record_invalidation_scan(6);
        metrics.record_invalidated(3);

        let snap = metrics.snapshot(2, 8);
        assert_eq!(snap.invalidation_scans, 2);
        assert_eq!(snap.scanned_keys, 10);
        assert_eq!(snap.invalidated_entries, 3);
        assert_eq!(snap.cached_ranges, 2);
    }
}
