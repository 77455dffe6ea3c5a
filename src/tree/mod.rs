pub mod splay;

pub use splay::SplayTree;

#[cfg(feature = "concurrency")]
pub use splay::ConcurrentSplayTree;
