//! Rename-time micro-op rewrites.
//!
//! Rename is the last point where a micro-op's operands can be reshaped before
//! dispatch, and three local rewrites happen here:
//! 1. **Lui-load fusion:** A load whose base register was produced by the
//!    immediately preceding upper-immediate load takes the full address
//!    immediate instead of the register.
//! 2. **Fence packing:** A fence carries its two logical source ids in the immediate.
//! 3. **Software prefetch:** A prefetch hint becomes a load-unit prefetch operation.
//!
//! A fused load has 20 immediate bits of room but needs the 20-bit upper
//! immediate plus its own 12-bit offset. The low eight upper-immediate bits go
//! into the immediate above the offset; the remaining twelve are spread over the
//! two physical source slots, `w` bits in `psrc[0]` and the rest in `psrc[1]`.

use crate::common::constants::{IMM_I_LEN, IMM_U_LEN, LOGICAL_REG_WIDTH, LUI_IMM_IN_IMM};
use crate::common::reg::PhysReg;
use crate::core::pipeline::latches::RenamedUop;
use crate::core::pipeline::signals::{CtrlSignals, FuType, LsuOp, SelImm, SrcType};

/// Operands of a load after lui-load fusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FusedLuiLoad {
    /// Low upper-immediate bits above the load offset.
    pub imm: u32,
    /// Remaining upper-immediate bits, low part first.
    pub psrc: [PhysReg; 2],
}

const fn mask(bits: u32) -> u32 {
    if bits >= u32::BITS { u32::MAX } else { (1 << bits) - 1 }
}

/// Returns true when `this` can absorb the upper immediate produced by `prev`.
///
/// `prev` must be a non-pc-relative upper-immediate load writing a real integer
/// register, and `this` a demand load whose base is that register.
pub fn is_lui_load(prev: &CtrlSignals, this: &CtrlSignals) -> bool {
    let last_is_lui =
        prev.sel_imm == SelImm::U && prev.src_type[0] != SrcType::Pc && prev.need_int_dest();
    let this_is_load = this.is_load() && this.src_type[0] == SrcType::Reg;
    last_is_lui && this_is_load && this.lsrc[0] == prev.ldest
}

/// Splits the upper immediate `lui_imm` across the load's immediate and source slots.
///
/// `psrc_width` is the bit width of an integer physical register id.
pub fn fuse_lui_load(lui_imm: u32, load_imm: u32, psrc_width: u32) -> FusedLuiLoad {
    let lui_imm = lui_imm & mask(IMM_U_LEN);
    let imm = ((lui_imm & mask(LUI_IMM_IN_IMM)) << IMM_I_LEN) | (load_imm & mask(IMM_I_LEN));
    let spill = lui_imm >> LUI_IMM_IN_IMM;
    let lo = spill & mask(psrc_width);
    let hi = spill.checked_shr(psrc_width).unwrap_or(0);
    FusedLuiLoad {
        imm,
        psrc: [PhysReg(lo as u16), PhysReg(hi as u16)],
    }
}

/// Reconstructs the 20-bit upper immediate of a fused load.
pub fn lui_imm_of(uop: &RenamedUop, psrc_width: u32) -> u32 {
    let lo = u32::from(uop.psrc[0].0) & mask(psrc_width);
    let hi = u32::from(uop.psrc[1].0).checked_shl(psrc_width).unwrap_or(0);
    let spill = hi | lo;
    ((spill << LUI_IMM_IN_IMM) | (uop.ctrl.imm >> IMM_I_LEN)) & mask(IMM_U_LEN)
}

/// Packs a fence's logical sources into its immediate.
pub fn pack_fence(ctrl: &mut CtrlSignals) {
    if ctrl.fu_type == FuType::Fence {
        let reg = mask(LOGICAL_REG_WIDTH);
        ctrl.imm = ((u32::from(ctrl.lsrc[1]) & reg) << LOGICAL_REG_WIDTH)
            | (u32::from(ctrl.lsrc[0]) & reg);
    }
}

/// Turns a software prefetch hint into a load-unit prefetch.
///
/// The hint's second source id selects the flavour: `1` prefetches for read,
/// anything else for write.
pub fn rewrite_soft_prefetch(ctrl: &mut CtrlSignals) {
    if ctrl.is_soft_prefetch {
        ctrl.fu_type = FuType::Ldu;
        ctrl.lsu_op = if ctrl.lsrc[1] == 1 {
            LsuOp::PrefetchR
        } else {
            LsuOp::PrefetchW
        };
        ctrl.sel_imm = SelImm::S;
        ctrl.imm &= !mask(LOGICAL_REG_WIDTH);
    }
}
