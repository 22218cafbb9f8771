//! Bookkeeping unit tests.

/// Free list behaviour for both variants.
pub mod freelist;

/// Reference counter properties.
pub mod refcount;
