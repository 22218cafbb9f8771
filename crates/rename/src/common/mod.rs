//! Common types shared throughout the rename model.
//!
//! This module provides the building blocks used by every component:
//! 1. **Constants:** Architectural register counts and immediate field widths.
//! 2. **Error Handling:** Invariant-violation and configuration error types.
//! 3. **Ring Pointers:** Wrap-aware circular queue pointers.
//! 4. **Register Ids:** Physical register ids and register classes.

/// Architectural and encoding constants.
pub mod constants;

/// Error types.
pub mod error;

/// Circular queue pointer arithmetic.
pub mod ptr;

/// Register identifiers.
pub mod reg;

pub use constants::ARCH_REGS;
pub use error::{ConfigError, RenameError};
pub use ptr::CircularPtr;
pub use reg::{PhysReg, RegClass};
