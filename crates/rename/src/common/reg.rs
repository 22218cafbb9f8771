//! Register Identifiers.
//!
//! This module provides the strong types used to name registers in the rename model:
//! 1. **Physical Registers:** `PhysReg`, an index into a physical register pool.
//! 2. **Register Classes:** `RegClass`, selecting the integer or floating-point pool.
//! 3. **Widths:** Helpers computing the bit width of a physical register id.

use std::fmt;

/// Identifier of a physical register within one register class.
///
/// Physical registers are owned collectively by a free list and, for the
/// integer class, a reference counter. An id is meaningful only together with
/// its [`RegClass`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PhysReg(pub u16);

impl PhysReg {
    /// Returns the id as a table index.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw id bits.
    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for PhysReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Register class of a logical or physical register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RegClass {
    /// General-purpose integer registers.
    #[default]
    Int,
    /// Floating-point registers.
    Fp,
}

impl fmt::Display for RegClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Fp => write!(f, "fp"),
        }
    }
}

/// Returns the number of bits needed to encode any id of a pool with `regs` entries.
///
/// A pool of one register still needs one bit.
pub const fn phys_reg_id_width(regs: usize) -> u32 {
    if regs <= 2 {
        1
    } else {
        usize::BITS - (regs - 1).leading_zeros()
    }
}
