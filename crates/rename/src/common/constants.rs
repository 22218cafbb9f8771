//! Global Rename Constants.
//!
//! This module defines constants shared by the rename model. It includes:
//! 1. **Register Constants:** Architectural register counts and logical-id widths.
//! 2. **Operand Constants:** Number of source operands carried by a micro-op.
//! 3. **Immediate Constants:** Field widths of the packed immediate union.

/// Number of architectural registers per register class (x0-x31, f0-f31).
pub const ARCH_REGS: usize = 32;

/// Width in bits of a logical register id.
pub const LOGICAL_REG_WIDTH: u32 = 5;

/// Number of logical source operands per micro-op (rs1, rs2, rs3).
pub const NUM_SRCS: usize = 3;

/// Number of rename-table lookups per lane (three sources plus the old destination).
pub const NUM_LOOKUPS: usize = NUM_SRCS + 1;

/// Width in bits of the immediate union carried by a micro-op.
///
/// The widest immediate that travels through rename is the U-type immediate.
pub const IMM_UNION_LEN: u32 = 20;

/// Width in bits of an I-type immediate.
pub const IMM_I_LEN: u32 = 12;

/// Width in bits of a U-type immediate (upper 20 bits of a 32-bit value).
pub const IMM_U_LEN: u32 = 20;

/// Bits of the upper immediate that fit into the immediate union next to a
/// full I-type immediate when an upper-immediate load is fused into a load.
pub const LUI_IMM_IN_IMM: u32 = IMM_UNION_LEN - IMM_I_LEN;

/// Bits of the upper immediate that must be carried in physical source slots
/// when an upper-immediate load is fused into a load.
pub const LUI_IMM_IN_PSRC: u32 = IMM_U_LEN - LUI_IMM_IN_IMM;
