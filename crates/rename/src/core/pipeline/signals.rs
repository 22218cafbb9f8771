//! Micro-op control signals seen by the rename stage.
//!
//! This module defines the decoded control fields that renaming consumes or rewrites:
//! 1. **Operand Typing:** Whether each source names an integer register, an fp register, or no register.
//! 2. **Unit Selection:** The functional unit class, used to spot loads, fences and prefetches.
//! 3. **Immediate Format:** Which immediate encoding the packed immediate field carries.
//! 4. **Destination Flags:** Register-file write enables and the move marker used by move elimination.

use crate::common::constants::{IMM_UNION_LEN, NUM_SRCS};

/// Kind of value a source operand reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SrcType {
    /// Integer register.
    #[default]
    Reg,

    /// Floating-point register.
    Fp,

    /// Immediate carried in the micro-op.
    Imm,

    /// Program counter.
    Pc,

    /// Operand not used.
    Unused,
}

/// Functional unit class a micro-op is dispatched to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FuType {
    /// Integer ALU.
    #[default]
    Alu,

    /// Conditional branch unit.
    Brh,

    /// Jump unit (jal, jalr, auipc).
    Jmp,

    /// Integer multiplier.
    Mul,

    /// Integer divider.
    Div,

    /// CSR access.
    Csr,

    /// Fence and sfence.
    Fence,

    /// Load unit.
    Ldu,

    /// Store unit.
    Stu,

    /// Atomic memory operations.
    Mou,

    /// Floating-point multiply-accumulate.
    Fmac,

    /// Floating-point miscellaneous (moves, compares, conversions).
    Fmisc,

    /// Floating-point divide and square root.
    Fdiv,

    /// Integer to floating-point conversion.
    I2f,
}

/// Immediate encoding held in [`CtrlSignals::imm`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelImm {
    /// No immediate.
    #[default]
    None,

    /// I-type (12 bits).
    I,

    /// S-type (12 bits).
    S,

    /// B-type.
    B,

    /// U-type (upper 20 bits).
    U,

    /// J-type.
    J,

    /// Zero-extended CSR immediate.
    Z,
}

/// Load/store unit operation selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LsuOp {
    /// Ordinary access described by the decoded instruction.
    #[default]
    Access,

    /// Software prefetch for reading.
    PrefetchR,

    /// Software prefetch for writing.
    PrefetchW,
}

/// Decoded control fields of one micro-op.
///
/// Logical register ids are five-bit architectural indices; `imm` holds the
/// low [`IMM_UNION_LEN`] bits of the encoded immediate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CtrlSignals {
    /// Operand kind of each source.
    pub src_type: [SrcType; NUM_SRCS],
    /// Logical source register ids.
    pub lsrc: [u8; NUM_SRCS],
    /// Logical destination register id.
    pub ldest: u8,
    /// Functional unit class.
    pub fu_type: FuType,
    /// Load/store unit operation.
    pub lsu_op: LsuOp,
    /// Writes the integer register file.
    pub rf_wen: bool,
    /// Writes the floating-point register file.
    pub fp_wen: bool,
    /// Register-to-register integer move, a candidate for elimination.
    pub is_move: bool,
    /// Software prefetch hint encoded as an integer op.
    pub is_soft_prefetch: bool,
    /// Immediate format.
    pub sel_imm: SelImm,
    /// Packed immediate.
    pub imm: u32,
}

impl CtrlSignals {
    /// Returns true when the micro-op needs a new integer physical register.
    ///
    /// Writes to `x0` are discarded and never renamed.
    #[inline]
    pub const fn need_int_dest(&self) -> bool {
        self.rf_wen && self.ldest != 0
    }

    /// Returns true when the micro-op needs a new fp physical register.
    #[inline]
    pub const fn need_fp_dest(&self) -> bool {
        self.fp_wen
    }

    /// Returns true for a demand load (software prefetches excluded).
    #[inline]
    pub fn is_load(&self) -> bool {
        self.fu_type == FuType::Ldu && !self.is_soft_prefetch
    }

    /// Masks `imm` to the width of the immediate union.
    #[inline]
    pub const fn imm_bits(&self) -> u32 {
        self.imm & ((1 << IMM_UNION_LEN) - 1)
    }
}
