//! Register rename stage model for an out-of-order RISC-V core.
//!
//! This crate implements a cycle-level model of register renaming with the following:
//! 1. **Units:** Circular-pointer free lists for the integer and fp pools and an integer reference counter.
//! 2. **Rename:** Whole-batch admission, allocation, intra-batch bypass, move elimination, and lui-load fusion.
//! 3. **Recovery:** Commit-time reclamation and walk-based rollback after a redirect.
//! 4. **Simulation:** Reference rename tables and reorder buffer closing the loop, plus statistics.
//!
//! # Examples
//!
//! ```
//! use rvsim_rename::config::Config;
//! use rvsim_rename::core::pipeline::latches::DecodedUop;
//! use rvsim_rename::core::pipeline::signals::CtrlSignals;
//! use rvsim_rename::sim::RenameDriver;
//!
//! let mut driver = RenameDriver::new(&Config::default()).unwrap();
//! let add = DecodedUop {
//!     pc: 0x8000_0000,
//!     ctrl: CtrlSignals { lsrc: [1, 2, 0], ldest: 3, rf_wen: true, ..Default::default() },
//! };
//! let out = driver.tick(&[Some(add)], &[], 0, None).unwrap();
//! assert!(out.accepted);
//! assert_eq!(driver.int_rat.spec(3), out.uops[0].pdest);
//! ```

/// Common types and constants (register ids, ring pointers, errors).
pub mod common;
/// Rename model configuration (widths, pool sizes, features).
pub mod config;
/// Rename stage and bookkeeping units.
pub mod core;
/// Closed-loop driver.
pub mod sim;
/// Rename statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// The rename stage; construct with `Rename::new`.
pub use crate::core::Rename;
/// Closed-loop driver; construct with `RenameDriver::new`.
pub use crate::sim::RenameDriver;
