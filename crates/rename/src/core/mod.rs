//! Rename-stage model.
//!
//! This module contains the register-renaming hardware: the bookkeeping units
//! that own physical registers and the pipeline stage that drives them each cycle.

/// Rename pipeline stage (orchestrator, latches, signals, reference table and ROB).
pub mod pipeline;

/// Bookkeeping units (free lists, reference counter).
pub mod units;

pub use self::pipeline::rename::Rename;
