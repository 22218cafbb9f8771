//! Rename table for one register class.
//!
//! Maps each architectural register to a physical register twice over:
//! the speculative table is written at rename and read by the next batch,
//! the architectural table follows commit. A walk restores speculative
//! entries from the old destinations recorded in the reorder buffer.

use crate::common::constants::{ARCH_REGS, NUM_SRCS};
use crate::common::reg::{PhysReg, RegClass};
use crate::core::pipeline::latches::{CommitInfo, RatReadResult, RatWrite};

/// Speculative and architectural mappings of one register class.
#[derive(Clone, Debug)]
pub struct RenameTable {
    class: RegClass,
    /// Mappings as of the youngest renamed micro-op.
    spec: [PhysReg; ARCH_REGS],
    /// Mappings as of the youngest committed micro-op.
    arch: [PhysReg; ARCH_REGS],
}

impl RenameTable {
    /// Creates the reset table: `x_i → p_i`.
    pub fn new(class: RegClass) -> Self {
        let identity = std::array::from_fn(|i| PhysReg(i as u16));
        Self {
            class,
            spec: identity,
            arch: identity,
        }
    }

    /// Register class of the table.
    pub const fn class(&self) -> RegClass {
        self.class
    }

    /// Speculative mapping of `lreg`.
    pub fn spec(&self, lreg: u8) -> PhysReg {
        self.spec[usize::from(lreg) % ARCH_REGS]
    }

    /// Architectural mapping of `lreg`.
    pub fn arch(&self, lreg: u8) -> PhysReg {
        self.arch[usize::from(lreg) % ARCH_REGS]
    }

    /// Speculative table, indexed by logical register.
    pub const fn spec_table(&self) -> &[PhysReg; ARCH_REGS] {
        &self.spec
    }

    /// Architectural table, indexed by logical register.
    pub const fn arch_table(&self) -> &[PhysReg; ARCH_REGS] {
        &self.arch
    }

    /// Reads sources and the current destination mapping for one lane.
    pub fn read(&self, lsrc: [u8; NUM_SRCS], ldest: u8) -> RatReadResult {
        RatReadResult {
            psrc: lsrc.map(|r| self.spec(r)),
            old_pdest: self.spec(ldest),
        }
    }

    /// Applies rename-time writes in lane order, so the youngest writer of a
    /// register wins. Writes for the other class and to integer `x0` are ignored.
    pub fn write(&mut self, writes: &[RatWrite]) {
        for w in writes.iter().filter(|w| w.class == self.class) {
            if self.writable(w.ldest) {
                self.spec[usize::from(w.ldest)] = w.pdest;
            }
        }
    }

    /// Records a committed mapping.
    pub fn commit(&mut self, info: &CommitInfo) {
        if self.owns(info) {
            self.arch[usize::from(info.ldest)] = info.pdest;
        }
    }

    /// Undoes a walked mapping. Walks arrive youngest first.
    pub fn walk(&mut self, info: &CommitInfo) {
        if self.owns(info) {
            self.spec[usize::from(info.ldest)] = info.old_pdest;
        }
    }

    /// Number of distinct physical registers the speculative table names.
    pub fn distinct_spec(&self) -> usize {
        let mut regs: Vec<PhysReg> = self.spec.to_vec();
        regs.sort_unstable();
        regs.dedup();
        regs.len()
    }

    fn writable(&self, ldest: u8) -> bool {
        usize::from(ldest) < ARCH_REGS && (self.class == RegClass::Fp || ldest != 0)
    }

    fn owns(&self, info: &CommitInfo) -> bool {
        let wen = match self.class {
            RegClass::Int => info.rf_wen,
            RegClass::Fp => info.fp_wen,
        };
        wen && self.writable(info.ldest)
    }
}
