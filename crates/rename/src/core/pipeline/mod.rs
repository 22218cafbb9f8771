//! Rename pipeline stage and its neighbours.
//!
//! It includes the following components:
//! 1. **Signals:** Decoded control fields that rename consumes or rewrites.
//! 2. **Latches:** Per-cycle input and output records of the stage.
//! 3. **Rename:** The orchestrator, its bypass network and rename-time rewrites.
//! 4. **Rename Table:** Speculative and architectural mappings per register class.
//! 5. **Reorder Buffer:** The commit, redirect and walk source.

/// Per-cycle records exchanged with decode, dispatch and the reorder buffer.
pub mod latches;

/// Speculative and architectural rename tables.
pub mod rat;

/// Rename stage orchestrator.
pub mod rename;

/// Reorder buffer model.
pub mod rob;

/// Decoded control signals.
pub mod signals;
