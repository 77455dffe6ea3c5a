pub use crate::ds::{SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::memo::{fibonacci, MAX_FIB_N};
pub use crate::policy::lru::LruCache;
pub use crate::query::RangeSumCache;
pub use crate::traits::{CoreCache, LruCacheTrait, MemoStore, MutableCache};
pub use crate::tree::splay::SplayTree;

#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
#[cfg(feature = "concurrency")]
pub use crate::tree::splay::ConcurrentSplayTree;

#[cfg(feature = "metrics")]
pub use crate::metrics::{LruMetricsSnapshot, RangeSumMetricsSnapshot, SplayMetricsSnapshot};
