//! Physical register bookkeeping units.
//!
//! These units own the physical register pools on behalf of the rename stage.

/// Free lists of unmapped physical registers.
pub mod freelist;

/// Reference counts of integer physical registers.
pub mod refcount;
