//! Splay tree: a self-adjusting binary search tree used as an ordered memo
//! store.
//!
//! Every access splays the touched key to the root through rotations, so
//! recently-used keys cluster near the top and repeated access patterns run
//! in amortized O(log n) (worst case O(n) for a single operation). Nodes live
//! in a [`SlotArena`] and reference children by [`SlotId`]; rotations move
//! ids between `left`/`right` fields without moving values, and each subtree
//! id is reachable from exactly one parent slot.
//!
//! ```text
//!   right_rotate(x)            left_rotate(x)
//!
//!        x          y               x              y
//!       / \        / \             / \            / \
//!      y   C  →   A   x           A   y     →    x   C
//!     / \            / \             / \        / \
//!    A   B          B   C           B   C      A   B
//! ```
//!
//! The splay itself is recursive: each call descends at most one
//! key-comparison step along the search path, so recursion depth is bounded
//! by the tree height.
//!
//! ## Insert is a guarded create
//!
//! [`SplayTree::insert`] never overwrites: if the key is already present
//! (checked after splaying), the stored value is preserved exactly and the
//! call is a no-op. Callers that memoize compute each value once, so the
//! first write is the only write.
//!
//! There is no delete operation; a tree lives for one computation session
//! and is dropped whole.

use std::cmp::Ordering;

use crate::ds::{SlotArena, SlotId};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{SplayMetrics, SplayMetricsSnapshot};
use crate::traits::MemoStore;

struct Node<K, V> {
    key: K,
    value: V,
    left: Option<SlotId>,
    right: Option<SlotId>,
}

/// A self-adjusting binary search tree.
///
/// # Example
///
/// ```
/// use memokit::tree::splay::SplayTree;
///
/// let mut tree = SplayTree::new();
/// tree.insert(3, "three");
/// tree.insert(1, "one");
/// tree.insert(2, "two");
///
/// assert_eq!(tree.search(&1), Some(&"one"));
/// // The searched key is now at the root.
/// assert_eq!(tree.root_entry(), Some((&1, &"one")));
/// assert_eq!(tree.search(&9), None);
/// ```
pub struct SplayTree<K, V> {
    arena: SlotArena<Node<K, V>>,
    root: Option<SlotId>,
    #[cfg(feature = "metrics")]
    metrics: SplayMetrics,
}

impl<K, V> SplayTree<K, V>
where
    K: Ord,
{
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            root: None,
            #[cfg(feature = "metrics")]
            metrics: SplayMetrics::default(),
        }
    }

    /// Creates an empty tree with preallocated node storage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            root: None,
            #[cfg(feature = "metrics")]
            metrics: SplayMetrics::default(),
        }
    }

    /// Returns the number of keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the tree is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Looks up a key, splaying it to the root.
    ///
    /// On a hit the key's node becomes the root and its value is returned.
    /// On a miss the closest-approached node on the search path becomes the
    /// root and `None` is returned; the miss still restructures the tree.
    pub fn search(&mut self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_search_call();

        self.root = Self::splay(&mut self.arena, self.root, key);
        match self.root {
            Some(root_id) if self.arena[root_id].key == *key => {
                #[cfg(feature = "metrics")]
                self.metrics.record_search_hit();
                Some(&self.arena[root_id].value)
            }
            _ => {
                #[cfg(feature = "metrics")]
                self.metrics.record_search_miss();
                None
            }
        }
    }

    /// Inserts a key-value pair if the key is absent.
    ///
    /// The key is splayed first. If it is already present the call is a
    /// no-op and the stored value is preserved exactly. Otherwise a new node
    /// becomes the root, taking one of the old root's subtrees: for a key
    /// smaller than the old root, the old root's left subtree moves under
    /// the new node's left and the old root itself becomes the right child;
    /// the mirror split applies for a larger key.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::tree::splay::SplayTree;
    ///
    /// let mut tree = SplayTree::new();
    /// tree.insert(1, "first");
    /// tree.insert(1, "second"); // no-op: key already present
    ///
    /// assert_eq!(tree.search(&1), Some(&"first"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let root_id = match Self::splay(&mut self.arena, self.root, &key) {
            Some(id) => id,
            None => {
                // Empty tree: the new node is the root
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_created();

                let id = self.arena.insert(Node {
                    key,
                    value,
                    left: None,
                    right: None,
                });
                self.root = Some(id);
                return;
            }
        };

        if self.arena[root_id].key == key {
            // Guarded create: present key keeps its original value
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_existing();

            self.root = Some(root_id);
            return;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_created();

        let (left, right) = if key < self.arena[root_id].key {
            let left = self.arena[root_id].left.take();
            (left, Some(root_id))
        } else {
            let right = self.arena[root_id].right.take();
            (Some(root_id), right)
        };

        let id = self.arena.insert(Node {
            key,
            value,
            left,
            right,
        });
        self.root = Some(id);
    }

    /// Returns the root entry without restructuring.
    ///
    /// After a successful [`search`](Self::search) this is the searched key;
    /// after a miss it is the closest-approached key.
    pub fn root_entry(&self) -> Option<(&K, &V)> {
        self.root.map(|id| {
            let node = &self.arena[id];
            (&node.key, &node.value)
        })
    }

    /// Iterates over entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            stack: Vec::new(),
            current: self.root,
        }
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Verifies the search-order invariant, returning which check failed.
    ///
    /// Walks the tree in order checking strict key ascent and that every
    /// arena slot is reachable from the root exactly once.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut count = 0usize;
        let mut prev: Option<&K> = None;

        for (key, _) in self.iter() {
            count += 1;
            if count > self.arena.len() {
                return Err(InvariantError::new("cycle in tree links"));
            }
            if let Some(prev_key) = prev {
                if prev_key >= key {
                    return Err(InvariantError::new("search order violated"));
                }
            }
            prev = Some(key);
        }

        if count != self.arena.len() {
            return Err(InvariantError::new(
                "reachable nodes do not match arena population",
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Splay and rotation primitives
    // =========================================================================

    /// Splays `key` toward the root of the subtree rooted at `root`.
    ///
    /// Returns the new subtree root: the node holding `key` if present,
    /// otherwise the closest node approached on the search path. Each call
    /// recurses at most one comparison step deeper, picking the zig-zig case
    /// (key beyond the child, rotate twice on the same side) or the zig-zag
    /// case (key between child and root, rotate the child first).
    fn splay(arena: &mut SlotArena<Node<K, V>>, root: Option<SlotId>, key: &K) -> Option<SlotId> {
        let mut root_id = root?;

        match key.cmp(&arena[root_id].key) {
            Ordering::Equal => Some(root_id),
            Ordering::Less => {
                // Closest approach: nothing further left to split
                let Some(left) = arena[root_id].left else {
                    return Some(root_id);
                };

                match key.cmp(&arena[left].key) {
                    Ordering::Less => {
                        // Zig-zig: bring the target up the left spine, then
                        // rotate the root early so the final rotation below
                        // finishes the double promotion
                        let grandchild = arena[left].left;
                        let sub = Self::splay(arena, grandchild, key);
                        arena[left].left = sub;
                        root_id = Self::rotate_right(arena, root_id);
                    }
                    Ordering::Greater => {
                        // Zig-zag: splay inside left.right, then rotate the
                        // left child leftward if anything surfaced
                        let grandchild = arena[left].right;
                        let sub = Self::splay(arena, grandchild, key);
                        arena[left].right = sub;
                        if arena[left].right.is_some() {
                            let new_left = Self::rotate_left(arena, left);
                            arena[root_id].left = Some(new_left);
                        }
                    }
                    Ordering::Equal => {}
                }

                if arena[root_id].left.is_some() {
                    Some(Self::rotate_right(arena, root_id))
                } else {
                    Some(root_id)
                }
            }
            Ordering::Greater => {
                let Some(right) = arena[root_id].right else {
                    return Some(root_id);
                };

                match key.cmp(&arena[right].key) {
                    Ordering::Greater => {
                        let grandchild = arena[right].right;
                        let sub = Self::splay(arena, grandchild, key);
                        arena[right].right = sub;
                        root_id = Self::rotate_left(arena, root_id);
                    }
                    Ordering::Less => {
                        let grandchild = arena[right].left;
                        let sub = Self::splay(arena, grandchild, key);
                        arena[right].left = sub;
                        if arena[right].left.is_some() {
                            let new_right = Self::rotate_right(arena, right);
                            arena[root_id].right = Some(new_right);
                        }
                    }
                    Ordering::Equal => {}
                }

                if arena[root_id].right.is_some() {
                    Some(Self::rotate_left(arena, root_id))
                } else {
                    Some(root_id)
                }
            }
        }
    }

    /// Promotes `x`'s left child; `x` becomes its right child.
    ///
    /// `x`'s left subtree is replaced by the promoted node's old right
    /// subtree. Returns `x` unchanged if it has no left child.
    fn rotate_right(arena: &mut SlotArena<Node<K, V>>, x: SlotId) -> SlotId {
        let Some(y) = arena[x].left.take() else {
            return x;
        };
        arena[x].left = arena[y].right.take();
        arena[y].right = Some(x);
        y
    }

    /// Promotes `x`'s right child; `x` becomes its left child. Mirror of
    /// [`rotate_right`](Self::rotate_right).
    fn rotate_left(arena: &mut SlotArena<Node<K, V>>, x: SlotId) -> SlotId {
        let Some(y) = arena[x].right.take() else {
            return x;
        };
        arena[x].right = arena[y].left.take();
        arena[y].left = Some(x);
        y
    }
}

#[cfg(feature = "metrics")]
impl<K, V> SplayTree<K, V>
where
    K: Ord,
{
    /// Returns a copy of the operation counters.
    pub fn metrics_snapshot(&self) -> SplayMetricsSnapshot {
        self.metrics.snapshot(self.arena.len())
    }
}

impl<K: Ord, V> Default for SplayTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for SplayTree<K, V>
where
    K: Ord,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplayTree")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Ordered memo table: lookup splays, record is a guarded create.
impl<K, V> MemoStore<K, V> for SplayTree<K, V>
where
    K: Ord,
    V: Clone,
{
    #[inline]
    fn lookup(&mut self, key: &K) -> Option<V> {
        self.search(key).cloned()
    }

    #[inline]
    fn record(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

/// In-order iterator over a [`SplayTree`], driven by an explicit stack.
pub struct Iter<'a, K, V> {
    arena: &'a SlotArena<Node<K, V>>,
    stack: Vec<SlotId>,
    current: Option<SlotId>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // Descend the left spine, then yield and step into the right subtree
        while let Some(id) = self.current {
            self.stack.push(id);
            self.current = self.arena[id].left;
        }

        let id = self.stack.pop()?;
        self.current = self.arena[id].right;

        let node = &self.arena[id];
        Some((&node.key, &node.value))
    }
}

// ---------------------------------------------------------------------------
// Concurrent wrapper
// ---------------------------------------------------------------------------

/// Thread-safe splay tree serializing every operation through one mutex.
///
/// Splaying restructures the tree on every access, search included, so all
/// operations are writes to the shared layout; one mutex per instance is the
/// whole locking discipline.
#[cfg(feature = "concurrency")]
pub struct ConcurrentSplayTree<K, V> {
    inner: parking_lot::Mutex<SplayTree<K, V>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentSplayTree<K, V>
where
    K: Ord,
    V: Clone,
{
    /// Creates an empty thread-safe tree.
    pub fn new() -> Self {
        Self {
            inner: parking_lot::Mutex::new(SplayTree::new()),
        }
    }

    /// Looks up a key, splaying it to the root.
    pub fn search(&self, key: &K) -> Option<V> {
        self.inner.lock().search(key).cloned()
    }

    /// Inserts a key-value pair if the key is absent.
    pub fn insert(&self, key: K, value: V) {
        self.inner.lock().insert(key, value)
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }
}

#[cfg(feature = "concurrency")]
impl<K: Ord, V: Clone> Default for ConcurrentSplayTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
