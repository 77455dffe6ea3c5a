//! Error types for the memokit library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (e.g. zero capacity).
//!
//! ## Example Usage
//!
//! ```
//! use memokit::error::ConfigError;
//! use memokit::policy::lru::LruCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<LruCache<u64, i64>, ConfigError> = LruCache::try_new(100);
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad = LruCache::<u64, i64>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal structure invariants are violated.
///
/// Produced by `check_invariants` methods on [`LruCache`](crate::policy::lru::LruCache)
/// and [`SplayTree`](crate::tree::splay::SplayTree). Carries a human-readable
/// description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruCache::try_new`](crate::policy::lru::LruCache::try_new) and
/// [`RangeSumCache::try_new`](crate::query::RangeSumCache::try_new).
///
/// # Example
///
/// ```
/// use memokit::policy::lru::LruCache;
///
/// let err = LruCache::<u64, i64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("recency list length mismatch");
        assert_eq!(err.to_string(), "recency list length mismatch");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("broken link");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("broken link"));
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be at least 1");
        assert_eq!(err.to_string(), "capacity must be at least 1");
    }

    #[test]
    fn config_debug_includes_message() {
        let err = ConfigError::new("bad capacity");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad capacity"));
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
