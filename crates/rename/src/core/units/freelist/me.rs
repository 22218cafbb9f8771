//! Move-Elimination Free List.
//!
//! Used for the integer register class. A physical register may back several
//! architectural names at once, so it can only return to the ring when the
//! reference counter says its last mapping is gone. Reclamation therefore takes
//! a [`FreedRegs`] batch, which only [`RefCounter`](crate::core::units::refcount::RefCounter)
//! produces, instead of raw ids.
//!
//! Because eliminated moves let fewer than 32 physical registers back the
//! architectural state, the ring spans the whole pool.

use super::{FreeList, FreeRing};
use crate::common::constants::ARCH_REGS;
use crate::common::error::RenameError;
use crate::common::reg::{PhysReg, RegClass};
use crate::core::units::refcount::FreedRegs;

/// Free list whose reclamation is driven by reference counts.
#[derive(Clone, Debug)]
pub struct MeFreeList {
    ring: FreeRing,
}

impl MeFreeList {
    /// Creates the reset state for a pool of `phys_regs` registers:
    /// `p0..p31` are mapped, the rest are free.
    pub fn new(phys_regs: usize) -> Self {
        let initial = (ARCH_REGS..phys_regs).map(|i| PhysReg(i as u16));
        Self {
            ring: FreeRing::new(RegClass::Int, phys_regs, phys_regs, initial),
        }
    }

    /// Creates a list over an explicit ring layout.
    pub fn with_ring(ring: FreeRing) -> Self {
        Self { ring }
    }

    /// Returns registers whose reference count reached zero.
    ///
    /// # Errors
    ///
    /// [`RenameError::DoubleFree`] or [`RenameError::FreeListOverflow`]; nothing
    /// is enqueued on error.
    pub fn reclaim(&mut self, freed: &FreedRegs) -> Result<(), RenameError> {
        self.ring.free(freed.as_slice())
    }
}

impl FreeList for MeFreeList {
    fn ring(&self) -> &FreeRing {
        &self.ring
    }

    fn allocate(&mut self, req: &[bool]) -> Result<Vec<Option<PhysReg>>, RenameError> {
        self.ring.allocate(req)
    }

    fn step_back(&mut self, steps: usize) -> Result<(), RenameError> {
        self.ring.step_back(steps)
    }
}
