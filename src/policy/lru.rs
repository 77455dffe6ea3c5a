//! Least Recently Used cache with O(1) operations.
//!
//! A hash index (`FxHashMap`) over an intrusive doubly-linked recency list:
//! the index makes lookup O(1), the list makes "move to most-recent" and
//! "evict least-recent" O(1). A plain ordered or linear structure would make
//! one of those operations linear, so both layers are required.
//!
//! ```text
//!   FxHashMap<K, NonNull<Node>>        recency list (head = MRU)
//!   ┌─────────┬──────────┐
//!   │   key   │  node *  │──────►  head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!   └─────────┴──────────┘                  MRU                LRU
//! ```
//!
//! Values are stored directly in the nodes (no `Arc` wrapping); entries here
//! are small precomputed results, not shared buffers.
//!
//! ## Capacity contract
//!
//! Capacity is fixed at construction and must be at least 1. [`LruCache::new`]
//! panics on zero; [`LruCache::try_new`] returns a [`ConfigError`] instead.
//! An overflowing insert evicts exactly one entry, since an insert adds at
//! most one.
//!
//! ## Thread safety
//!
//! `LruCache` is single-threaded. Every operation, including `get`, rewrites
//! the recency list, so the `concurrency` feature's [`ConcurrentLruCache`]
//! serializes all access through one mutex rather than splitting readers from
//! writers.

use std::hash::Hash;
use std::mem;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::{LruMetrics, LruMetricsSnapshot};
use crate::traits::{CoreCache, LruCacheTrait, MemoStore, MutableCache};

/// Node in the recency list.
///
/// Layout keeps the link fields first: they are touched on every list
/// operation, the key only on eviction, the value only on hits.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    key: K,
    value: V,
}

/// A fixed-capacity LRU cache.
///
/// All operations are O(1) average case. Lookups promote the key to
/// most-recently-used; an insert that would exceed capacity evicts the
/// least-recently-used entry first.
///
/// # Example
///
/// ```
/// use memokit::policy::lru::LruCache;
///
/// let mut cache = LruCache::new(2);
///
/// cache.insert(1, "one");
/// cache.insert(2, "two");
/// cache.get(&1);
///
/// // Key 2 is now least recently used and gets evicted.
/// cache.insert(3, "three");
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// ```
pub struct LruCache<K, V> {
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) to handle
    /// invalid configuration without panicking.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::policy::lru::LruCache;
    ///
    /// let cache: LruCache<u64, i64> = LruCache::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a cache with the given capacity, rejecting zero.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::policy::lru::LruCache;
    ///
    /// assert!(LruCache::<u64, i64>::try_new(1).is_ok());
    /// assert!(LruCache::<u64, i64>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("LruCache capacity must be at least 1"));
        }
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Returns the number of entries in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the maximum capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if the key exists in the cache.
    ///
    /// Does not update recency order.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Gets a reference to a value, promoting the key to most-recently-used.
    ///
    /// Returns `None` for an unknown key; absence is an expected outcome, not
    /// an error.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(10);
    /// cache.insert(1, "value");
    ///
    /// assert_eq!(cache.get(&1), Some(&"value"));
    /// assert_eq!(cache.get(&2), None);
    /// ```
    #[inline(always)]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let node_ptr = match self.map.get(key) {
            Some(&ptr) => ptr,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            }
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        // Move to front (MRU position)
        self.detach(node_ptr);
        self.attach_front(node_ptr);

        // SAFETY: node_ptr is valid as long as it's in the map
        Some(unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Gets a mutable reference to a value, promoting the key to
    /// most-recently-used.
    #[inline(always)]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node_ptr = *self.map.get(key)?;

        self.detach(node_ptr);
        self.attach_front(node_ptr);

        // SAFETY: node_ptr is valid as long as it's in the map
        Some(unsafe { &mut (*node_ptr.as_ptr()).value })
    }

    /// Peeks at a value without updating recency order.
    #[inline(always)]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map
            .get(key)
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Inserts a key-value pair, returning the previous value if the key
    /// existed.
    ///
    /// The key becomes most-recently-used either way. If the key is new and
    /// the cache is full, the least-recently-used entry is evicted: exactly
    /// one eviction, since an insert adds at most one entry.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(2);
    ///
    /// assert_eq!(cache.insert(1, "a"), None);
    /// assert_eq!(cache.insert(2, "b"), None);
    /// assert_eq!(cache.insert(1, "A"), Some("a")); // overwrite, no eviction
    ///
    /// cache.insert(3, "c"); // evicts key 2 (LRU)
    /// assert!(!cache.contains(&2));
    /// assert_eq!(cache.len(), 2);
    /// ```
    #[inline(always)]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        // Overwrite path: no eviction, entry count unchanged
        if let Some(&node_ptr) = self.map.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let old_value = unsafe {
                let node = node_ptr.as_ptr();
                mem::replace(&mut (*node).value, value)
            };

            self.detach(node_ptr);
            self.attach_front(node_ptr);

            return Some(old_value);
        }

        // New key: evict LRU first if full (capacity >= 1 by construction)
        if self.map.len() >= self.capacity {
            if self.pop_lru().is_some() {
                #[cfg(feature = "metrics")]
                self.metrics.record_eviction();
            }
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let node = Box::new(Node {
            prev: None,
            next: None,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));

        self.map.insert(key, node_ptr);
        self.attach_front(node_ptr);

        None
    }

    /// Removes a key from the cache, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let node_ptr = self.map.remove(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        self.detach(node_ptr);

        // SAFETY: we own the node after removing it from the map
        let node = unsafe { Box::from_raw(node_ptr.as_ptr()) };
        Some(node.value)
    }

    /// Removes and returns the least recently used entry.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(10);
    /// cache.insert(1, "one");
    /// cache.insert(2, "two");
    ///
    /// cache.get(&1); // key 2 is now LRU
    /// assert_eq!(cache.pop_lru(), Some((2, "two")));
    /// ```
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let tail_ptr = self.tail?;

        // SAFETY: tail is valid while Some
        let key = unsafe { (*tail_ptr.as_ptr()).key.clone() };

        self.map.remove(&key);
        self.detach(tail_ptr);

        let node = unsafe { Box::from_raw(tail_ptr.as_ptr()) };
        Some((node.key, node.value))
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|node_ptr| unsafe {
            let node = node_ptr.as_ptr();
            (&(*node).key, &(*node).value)
        })
    }

    /// Marks a key as most-recently-used without returning its value.
    ///
    /// Returns `true` if the key existed.
    #[inline(always)]
    pub fn touch(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        if let Some(&node_ptr) = self.map.get(key) {
            self.detach(node_ptr);
            self.attach_front(node_ptr);

            #[cfg(feature = "metrics")]
            self.metrics.record_touch_found();

            true
        } else {
            false
        }
    }

    /// Iterates over the cached keys in unspecified order.
    ///
    /// This is the scan surface for callers that must find keys matching a
    /// predicate (e.g. range invalidation); iteration does not touch recency
    /// order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    /// Returns a key's position in recency order (0 = most recent).
    ///
    /// O(n) list scan; intended for tests and diagnostics.
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        let &target_ptr = self.map.get(key)?;
        let mut rank = 0usize;
        let mut current = self.head;

        while let Some(ptr) = current {
            if ptr == target_ptr {
                return Some(rank);
            }
            rank += 1;
            current = unsafe { ptr.as_ref().next };
        }
        None
    }

    /// Clears all entries from the cache.
    pub fn clear(&mut self) {
        while self.pop_lru().is_some() {}
    }

    /// Verifies the map/list invariants, returning which one failed.
    ///
    /// Walks the recency list checking link symmetry, cycle-freedom, and
    /// agreement with the hash index.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() > self.capacity {
            return Err(InvariantError::new("entry count exceeds capacity"));
        }

        let mut count = 0usize;
        let mut prev: Option<NonNull<Node<K, V>>> = None;
        let mut current = self.head;

        while let Some(ptr) = current {
            count += 1;
            if count > self.map.len() {
                return Err(InvariantError::new("cycle in recency list"));
            }

            // SAFETY: every listed node is owned by the cache
            let node = unsafe { ptr.as_ref() };
            if node.prev != prev {
                return Err(InvariantError::new("asymmetric prev link in recency list"));
            }
            if !self.map.contains_key(&node.key) {
                return Err(InvariantError::new("listed key missing from index"));
            }

            prev = current;
            current = node.next;
        }

        if count != self.map.len() {
            return Err(InvariantError::new(
                "recency list length does not match index",
            ));
        }
        if self.tail != prev {
            return Err(InvariantError::new("tail does not point at last node"));
        }
        Ok(())
    }

    // =========================================================================
    // Internal linked-list operations
    // =========================================================================

    /// Detaches a node from its current position in the list.
    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ptr();
            let prev = (*node).prev;
            let next = (*node).next;

            match prev {
                Some(prev_ptr) => (*prev_ptr.as_ptr()).next = next,
                None => self.head = next,
            }

            match next {
                Some(next_ptr) => (*next_ptr.as_ptr()).prev = prev,
                None => self.tail = prev,
            }

            (*node).prev = None;
            (*node).next = None;
        }
    }

    /// Attaches a node at the front (MRU position) of the list.
    #[inline(always)]
    fn attach_front(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ptr();
            (*node).prev = None;
            (*node).next = self.head;

            match self.head {
                Some(head_ptr) => (*head_ptr.as_ptr()).prev = Some(node_ptr),
                None => self.tail = Some(node_ptr),
            }

            self.head = Some(node_ptr);
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Returns a copy of the operation counters.
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.metrics.snapshot(self.map.len(), self.capacity)
    }
}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LruCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        LruCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        LruCache::capacity(self)
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruCache::pop_lru(self)
    }

    #[inline]
    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    #[inline]
    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LruCache::recency_rank(self, key)
    }
}

/// Bounded memo table: lookup promotes, record inserts (and may evict).
///
/// Suitable when the memoized key space is known to fit the capacity; evicted
/// results are simply recomputed on the next miss.
impl<K, V> MemoStore<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
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

impl<K, V> Drop for LruCache<K, V> {
    fn drop(&mut self) {
        // Free all nodes
        let mut current = self.head;
        while let Some(node_ptr) = current {
            unsafe {
                let node = Box::from_raw(node_ptr.as_ptr());
                current = node.next;
            }
        }
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

// SAFETY: LruCache is Send if K and V are Send; the raw pointers only
// reference heap memory owned by the struct.
unsafe impl<K: Send, V: Send> Send for LruCache<K, V> {}

// ---------------------------------------------------------------------------
// Concurrent wrapper
// ---------------------------------------------------------------------------

/// Thread-safe LRU cache serializing every operation through one mutex.
///
/// Recency restructuring is a read-modify-write of the shared list layout, so
/// even lookups mutate; a reader/writer split would buy nothing here. One
/// mutex per instance is the whole locking discipline.
#[cfg(feature = "concurrency")]
pub struct ConcurrentLruCache<K, V> {
    inner: parking_lot::Mutex<LruCache<K, V>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a thread-safe cache with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0; see [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: parking_lot::Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Creates a thread-safe cache, rejecting zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: parking_lot::Mutex::new(LruCache::try_new(capacity)?),
        })
    }

    /// Inserts a key-value pair, returning the previous value if it existed.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Gets a value by key, promoting it to most-recently-used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    /// Peeks at a value without updating recency order.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }

    /// Removes an entry by key.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Marks a key as most-recently-used.
    pub fn touch(&self, key: &K) -> bool {
        self.inner.lock().touch(key)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the maximum capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Returns `true` if the key exists.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }
}
