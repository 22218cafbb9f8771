//! Standard Free List.
//!
//! Used for the floating-point register class, which has no move elimination:
//! every mapping owns its physical register exclusively, so the register
//! displaced by a committed instruction goes straight back to the ring.

use super::{FreeList, FreeRing};
use crate::common::constants::ARCH_REGS;
use crate::common::error::RenameError;
use crate::common::reg::{PhysReg, RegClass};

/// Free list with direct reclamation.
///
/// At reset the architectural registers own `p0..p31` and the ring holds the
/// rest of the pool, so its capacity is `pool - ARCH_REGS`.
#[derive(Clone, Debug)]
pub struct StdFreeList {
    ring: FreeRing,
}

impl StdFreeList {
    /// Creates the reset state for a pool of `phys_regs` registers.
    pub fn new(class: RegClass, phys_regs: usize) -> Self {
        let capacity = phys_regs - ARCH_REGS;
        let initial = (ARCH_REGS..phys_regs).map(|i| PhysReg(i as u16));
        Self {
            ring: FreeRing::new(class, capacity, phys_regs, initial),
        }
    }

    /// Creates a list over an explicit ring layout.
    pub fn with_ring(ring: FreeRing) -> Self {
        Self { ring }
    }

    /// Returns registers to the ring, oldest-freed first.
    ///
    /// # Errors
    ///
    /// [`RenameError::DoubleFree`] if a register is already free or repeated,
    /// [`RenameError::FreeListOverflow`] if the ring cannot hold them. Nothing is
    /// enqueued on error.
    pub fn free(&mut self, regs: &[PhysReg]) -> Result<(), RenameError> {
        self.ring.free(regs)
    }
}

impl FreeList for StdFreeList {
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
