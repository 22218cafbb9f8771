//! Closed-loop simulation of the rename stage.
//!
//! Provides a driver that wires the rename stage to its reference rename
//! tables and reorder buffer so sequences of batches can be run end to end.

/// Cycle driver owning the stage and its neighbours.
pub mod driver;

pub use driver::RenameDriver;
