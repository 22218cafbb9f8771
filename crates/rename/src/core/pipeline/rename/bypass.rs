//! Intra-batch bypass network.
//!
//! Lanes renamed in the same cycle read the rename table before any of the
//! batch's writes land, so a lane that reads a register written by an earlier
//! lane must take that lane's new physical destination instead. Each lane makes
//! four lookups (three sources and the old destination); a lookup matches an
//! earlier lane when the logical index is equal and both sides agree on the
//! register class. The nearest earlier match wins.

use crate::common::constants::{NUM_LOOKUPS, NUM_SRCS};
use crate::common::reg::RegClass;
use crate::core::pipeline::signals::{CtrlSignals, SrcType};

/// Destination a lane claims this cycle, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteClaim {
    /// Logical destination.
    pub ldest: u8,
    /// Class of the renamed destination; `None` when the lane renames nothing.
    pub class: Option<RegClass>,
}

impl WriteClaim {
    /// Claim of a lane with the given destination needs.
    pub fn new(ctrl: &CtrlSignals, need_int: bool, need_fp: bool) -> Self {
        let class = if need_fp {
            Some(RegClass::Fp)
        } else if need_int {
            Some(RegClass::Int)
        } else {
            None
        };
        Self {
            ldest: ctrl.ldest,
            class,
        }
    }
}

/// A logical register read that may be satisfied by an earlier lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lookup {
    /// Logical register read.
    pub lreg: u8,
    /// Class read; `None` never matches.
    pub class: Option<RegClass>,
}

/// Register class a source operand reads, if it reads a register at all.
pub const fn src_class(src_type: SrcType) -> Option<RegClass> {
    match src_type {
        SrcType::Reg => Some(RegClass::Int),
        SrcType::Fp => Some(RegClass::Fp),
        SrcType::Imm | SrcType::Pc | SrcType::Unused => None,
    }
}

/// The four lookups of one lane: sources in order, then the old destination.
pub fn lookups(ctrl: &CtrlSignals, claim: WriteClaim) -> [Lookup; NUM_LOOKUPS] {
    let mut out = [Lookup::default(); NUM_LOOKUPS];
    for k in 0..NUM_SRCS {
        out[k] = Lookup {
            lreg: ctrl.lsrc[k],
            class: src_class(ctrl.src_type[k]),
        };
    }
    out[NUM_SRCS] = Lookup {
        lreg: claim.ldest,
        class: claim.class,
    };
    out
}

/// Index of the nearest earlier lane whose claim satisfies `lookup`.
///
/// `earlier` holds the claims of lanes `0..i` for lane `i`.
pub fn nearest_writer(earlier: &[WriteClaim], lookup: Lookup) -> Option<usize> {
    if lookup.class.is_none() {
        return None;
    }
    earlier
        .iter()
        .rposition(|w| w.class == lookup.class && w.ldest == lookup.lreg)
}

/// Bypass sources for every lookup of every lane in a batch.
///
/// Entry `[i][k]` is the lane whose destination lookup `k` of lane `i` takes,
/// or `None` to keep the rename-table value.
pub fn bypass_matrix(
    claims: &[WriteClaim],
    lanes: &[[Lookup; NUM_LOOKUPS]],
) -> Vec<[Option<usize>; NUM_LOOKUPS]> {
    lanes
        .iter()
        .enumerate()
        .map(|(i, lane)| lane.map(|l| nearest_writer(&claims[..i.min(claims.len())], l)))
        .collect()
}
