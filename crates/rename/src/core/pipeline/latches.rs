//! Latch structures at the boundaries of the rename stage.
//!
//! This module defines the records exchanged with neighbouring stages each cycle:
//! Decode → Rename → Dispatch, with the reorder buffer feeding commit, walk and
//! redirect back into Rename.
//!
//! 1. **Inputs:** Decoded micro-ops, memory-dependence hints, rename-table reads, commit info, redirect.
//! 2. **Outputs:** Renamed micro-ops, speculative rename-table writes, reclaimed registers, stall cause.
//!
//! Vectors indexed by lane hold one element per rename lane; shorter vectors
//! are padded with defaults.

use std::fmt;

use crate::common::constants::NUM_SRCS;
use crate::common::ptr::CircularPtr;
use crate::common::reg::{PhysReg, RegClass};
use crate::core::pipeline::signals::CtrlSignals;

/// Memory-dependence prediction for one lane (store sets and the wait table).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemDepHint {
    /// Wait table says the load should wait for older stores.
    pub load_wait_bit: bool,
    /// The store-set predictor found an entry.
    pub store_set_hit: bool,
    /// Store-set id.
    pub ssid: u16,
    /// The load must wait for all older stores, not just its store set.
    pub load_wait_strict: bool,
}

/// Micro-op presented by decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodedUop {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Decoded control fields.
    pub ctrl: CtrlSignals,
}

/// One lane of rename-table read results for a single register class.
///
/// Read with the lane's own logical ids against the pre-rename table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RatReadResult {
    /// Physical register of each logical source.
    pub psrc: [PhysReg; NUM_SRCS],
    /// Physical register currently mapped to the logical destination.
    pub old_pdest: PhysReg,
}

/// Micro-op leaving the rename stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenamedUop {
    /// Rename lane the micro-op occupied.
    pub lane: usize,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Control fields after rename-time rewrites.
    pub ctrl: CtrlSignals,
    /// Physical source registers.
    pub psrc: [PhysReg; NUM_SRCS],
    /// Physical destination register.
    pub pdest: PhysReg,
    /// Physical register displaced from the rename table.
    pub old_pdest: PhysReg,
    /// Sequence index assigned at rename.
    pub rob_idx: CircularPtr,
    /// Memory-dependence hints copied from the predictors.
    pub mem_dep: MemDepHint,
    /// Destination shares the physical register of source 0.
    pub eliminated_move: bool,
    /// Source 0 was replaced by the immediate of a preceding upper-immediate load.
    pub lui_fused: bool,
}

impl RenamedUop {
    /// Commit record the reorder buffer keeps for this micro-op.
    pub const fn commit_info(&self) -> CommitInfo {
        CommitInfo {
            ldest: self.ctrl.ldest,
            pdest: self.pdest,
            old_pdest: self.old_pdest,
            rf_wen: self.ctrl.rf_wen,
            fp_wen: self.ctrl.fp_wen,
            is_move: self.eliminated_move,
        }
    }
}

/// Speculative rename-table write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatWrite {
    /// Table written.
    pub class: RegClass,
    /// Logical register.
    pub ldest: u8,
    /// New mapping.
    pub pdest: PhysReg,
}

/// Per-entry information the reorder buffer reports on commit or walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitInfo {
    /// Logical destination.
    pub ldest: u8,
    /// Physical destination installed at rename.
    pub pdest: PhysReg,
    /// Physical register it displaced.
    pub old_pdest: PhysReg,
    /// Writes the integer register file.
    pub rf_wen: bool,
    /// Writes the floating-point register file.
    pub fp_wen: bool,
    /// Destination was produced by move elimination.
    pub is_move: bool,
}

impl CommitInfo {
    /// Returns true when the entry holds an integer mapping.
    #[inline]
    pub const fn need_int_dest(&self) -> bool {
        self.rf_wen && self.ldest != 0
    }

    /// Returns true when the entry took a register from the integer free list.
    #[inline]
    pub const fn allocated_int(&self) -> bool {
        self.need_int_dest() && !self.is_move
    }
}

/// Reorder-buffer retirement for one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RobCommits {
    /// Entries are being undone after a misprediction, youngest first.
    pub is_walk: bool,
    /// Entries retired or walked this cycle.
    pub infos: Vec<CommitInfo>,
}

impl RobCommits {
    /// Normal in-order retirement.
    pub const fn commit(infos: Vec<CommitInfo>) -> Self {
        Self {
            is_walk: false,
            infos,
        }
    }

    /// Walk of squashed entries.
    pub const fn walk(infos: Vec<CommitInfo>) -> Self {
        Self {
            is_walk: true,
            infos,
        }
    }
}

/// Misprediction redirect from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// Sequence index of the redirecting micro-op.
    pub rob_idx: CircularPtr,
    /// The redirecting micro-op is squashed as well.
    pub flush_itself: bool,
}

impl Redirect {
    /// First sequence index that is squashed.
    pub fn flush_from(&self) -> CircularPtr {
        if self.flush_itself {
            self.rob_idx
        } else {
            self.rob_idx + 1
        }
    }
}

/// Everything the rename stage samples in one cycle.
#[derive(Clone, Debug, Default)]
pub struct RenameInput {
    /// Decode lanes; `None` marks an empty lane.
    pub uops: Vec<Option<DecodedUop>>,
    /// Predictor hints per lane.
    pub hints: Vec<MemDepHint>,
    /// Integer rename-table reads per lane.
    pub int_reads: Vec<RatReadResult>,
    /// Floating-point rename-table reads per lane.
    pub fp_reads: Vec<RatReadResult>,
    /// Dispatch can accept a full batch.
    pub out_ready: bool,
    /// Misprediction redirect this cycle.
    pub redirect: Option<Redirect>,
    /// Retirement or walk this cycle.
    pub commits: RobCommits,
}

/// Reason a valid batch was held in decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallReason {
    /// The reorder buffer is walking.
    Walk,
    /// Not enough integer physical registers.
    IntFreeList,
    /// Not enough floating-point physical registers.
    FpFreeList,
    /// Dispatch is not ready.
    Dispatch,
}

impl fmt::Display for StallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Walk => write!(f, "walk"),
            Self::IntFreeList => write!(f, "int free list"),
            Self::FpFreeList => write!(f, "fp free list"),
            Self::Dispatch => write!(f, "dispatch"),
        }
    }
}

/// Everything the rename stage drives in one cycle.
#[derive(Clone, Debug, Default)]
pub struct RenameOutput {
    /// The decode batch was consumed.
    pub accepted: bool,
    /// Renamed micro-ops in lane order.
    pub uops: Vec<RenamedUop>,
    /// Speculative integer rename-table writes in lane order.
    pub int_writes: Vec<RatWrite>,
    /// Speculative fp rename-table writes in lane order.
    pub fp_writes: Vec<RatWrite>,
    /// Why a valid batch was not accepted.
    pub stall: Option<StallReason>,
    /// Integer registers returned to the free list by commit.
    pub int_freed: Vec<PhysReg>,
    /// Floating-point registers returned to the free list by commit.
    pub fp_freed: Vec<PhysReg>,
}
