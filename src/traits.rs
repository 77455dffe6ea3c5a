//! # Cache and Memo Trait Hierarchy
//!
//! Defines the seams between the recency cache, the ordered memo tree, and
//! their callers. The cache side is a small hierarchy; the memo side is a
//! single trait consumed by [`memo::fibonacci`](crate::memo::fibonacci).
//!
//! ```text
//!   ┌─────────────────────────────────┐     ┌──────────────────────────────┐
//!   │        CoreCache<K, V>          │     │        MemoStore<K, V>       │
//!   │                                 │     │                              │
//!   │  insert(&mut, K, V) → Option<V> │     │  lookup(&mut, &K) → Option<V>│
//!   │  get(&mut, &K) → Option<&V>     │     │  record(&mut, K, V)          │
//!   │  contains / len / capacity      │     │                              │
//!   └───────────────┬─────────────────┘     │  lookup may restructure the  │
//!                   │                       │  store; record may be a      │
//!                   ▼                       │  guarded create.             │
//!   ┌─────────────────────────────────┐     └──────────────────────────────┘
//!   │       MutableCache<K, V>        │
//!   │  remove(&K) / remove_batch      │       Implemented by FxHashMap,
//!   └───────────────┬─────────────────┘       SplayTree, and LruCache.
//!                   ▼
//!   ┌─────────────────────────────────┐
//!   │       LruCacheTrait<K, V>       │
//!   │  pop_lru / peek_lru / touch     │
//!   │  recency_rank                   │
//!   └─────────────────────────────────┘
//! ```
//!
//! `MemoStore::lookup` takes `&mut self` deliberately: a splay tree
//! restructures itself on every access, so even a "read" is a write to the
//! internal layout. Containers that do not reorder simply ignore the
//! mutability.

/// Core cache operations that every fixed-capacity cache supports.
///
/// # Example
///
/// ```
/// use memokit::policy::lru::LruCache;
/// use memokit::traits::CoreCache;
///
/// fn warm_cache<C: CoreCache<u64, i64>>(cache: &mut C, data: &[(u64, i64)]) {
///     for &(key, value) in data {
///         cache.insert(key, value);
///     }
/// }
///
/// let mut cache = LruCache::new(100);
/// warm_cache(&mut cache, &[(1, 10), (2, 20)]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the cache is at capacity and `key` is new, one entry is evicted
    /// according to the cache's policy before the new entry is inserted.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up a value by key.
    ///
    /// Takes `&mut self` because lookups may update policy state (e.g. LRU
    /// recency order). Returns `None` for an unknown key; absence is not an
    /// error.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Returns `true` if the key is present. Does not update policy state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries the cache can hold.
    fn capacity(&self) -> usize;

    /// Removes all entries.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes an entry by key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes every listed key, returning how many were present.
    ///
    /// The default implementation loops over [`remove`](MutableCache::remove).
    fn remove_batch(&mut self, keys: &[K]) -> usize {
        let mut removed = 0;
        for key in keys {
            if self.remove(key).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

/// Recency-ordered caches with LRU eviction.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Returns the least recently used entry without removing it or updating
    /// recency order.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks a key as most recently used without returning its value.
    ///
    /// Returns `true` if the key was present.
    fn touch(&mut self, key: &K) -> bool;

    /// Returns the key's position in recency order (0 = most recent), or
    /// `None` if absent. O(n) scan; intended for tests and diagnostics.
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Key-value stores usable as a memo table for recursive computations.
///
/// The contract is intentionally loose so that differently-shaped containers
/// fit behind one recursion:
///
/// - `lookup` may restructure the store as a side effect (a splay tree moves
///   the accessed key to the root).
/// - `record` may be a guarded create: a store is allowed to keep the first
///   value written for a key and ignore later writes. Memoization only ever
///   records one value per key, so callers cannot observe the difference.
///
/// # Example
///
/// ```
/// use memokit::traits::MemoStore;
/// use memokit::tree::splay::SplayTree;
///
/// let mut memo: SplayTree<u64, u128> = SplayTree::new();
/// memo.record(7, 13);
/// assert_eq!(memo.lookup(&7), Some(13));
/// assert_eq!(memo.lookup(&8), None);
/// ```
pub trait MemoStore<K, V> {
    /// Returns the recorded value for `key`, if any.
    fn lookup(&mut self, key: &K) -> Option<V>;

    /// Records a value for `key`.
    fn record(&mut self, key: K, value: V);
}
