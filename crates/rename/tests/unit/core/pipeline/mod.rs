//! Rename stage tests.



/// Lui-load fusion and other rewrites.
pub mod fusion;
