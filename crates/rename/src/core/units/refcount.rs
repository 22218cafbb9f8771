//! Physical Register Reference Counter.
//!
//! With move elimination a move maps its destination onto the physical register
//! of its source, so one integer physical register can back several
//! architectural names. The reference counter tracks how many live mappings
//! point at each register:
//! 1. **Allocate ports:** One increment per speculative rename-table write.
//! 2. **Deallocate ports:** One decrement per mapping retired at commit or undone by a walk.
//! 3. **Release:** A register whose count reaches zero is reported in `FreedRegs`.
//!
//! All ports of one call act on the same cycle boundary: increments and
//! decrements targeting the same register are summed before the count is
//! stored, and a register released by several ports is reported once.

use crate::common::constants::ARCH_REGS;
use crate::common::error::RenameError;
use crate::common::reg::{PhysReg, RegClass};

/// Registers whose reference count reached zero in one cycle.
///
/// Only [`RefCounter`] constructs this, which is what gates reclamation into
/// the move-elimination free list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreedRegs(Vec<PhysReg>);

impl FreedRegs {
    /// Released registers in deallocate-port order.
    pub fn as_slice(&self) -> &[PhysReg] {
        &self.0
    }

    /// Number of released registers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when nothing was released.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-register reference counts for one physical pool.
#[derive(Clone, Debug)]
pub struct RefCounter {
    counts: Vec<u16>,
}

/// Net effect of one cycle's ports on a single register.
#[derive(Clone, Copy)]
struct PortSum {
    reg: PhysReg,
    inc: u32,
    dec: u32,
}

impl RefCounter {
    /// Creates the reset state: the architectural registers own `p0..p31`
    /// with one reference each, every other register is unreferenced.
    pub fn new(phys_regs: usize) -> Self {
        let mut counts = vec![0; phys_regs];
        for c in counts.iter_mut().take(ARCH_REGS) {
            *c = 1;
        }
        Self { counts }
    }

    /// Number of registers tracked.
    pub fn size(&self) -> usize {
        self.counts.len()
    }

    /// Current count of `reg`.
    pub fn count(&self, reg: PhysReg) -> u16 {
        self.counts.get(reg.index()).copied().unwrap_or(0)
    }

    /// All counts, indexed by physical register id.
    pub fn counts(&self) -> &[u16] {
        &self.counts
    }

    /// Number of registers with at least one reference.
    pub fn referenced(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Applies one cycle of allocate and deallocate ports.
    ///
    /// A register is released when at least one deallocate port names it and
    /// its summed count lands on zero.
    ///
    /// # Errors
    ///
    /// [`RenameError::RefCountUnderflow`] if decrements exceed the count plus
    /// increments, [`RenameError::RefCountOverflow`] if the count would leave the
    /// counter's range, [`RenameError::RegOutOfRange`] for an unknown id. No count
    /// changes on error.
    pub fn tick(
        &mut self,
        allocate: &[Option<PhysReg>],
        deallocate: &[Option<PhysReg>],
    ) -> Result<FreedRegs, RenameError> {
        let mut sums: Vec<PortSum> = Vec::with_capacity(allocate.len() + deallocate.len());
        let mut bump = |reg: PhysReg, inc: u32, dec: u32| {
            if let Some(s) = sums.iter_mut().find(|s| s.reg == reg) {
                s.inc += inc;
                s.dec += dec;
            } else {
                sums.push(PortSum { reg, inc, dec });
            }
        };
        for &reg in deallocate.iter().flatten() {
            bump(reg, 0, 1);
        }
        for &reg in allocate.iter().flatten() {
            bump(reg, 1, 0);
        }

        let mut next = Vec::with_capacity(sums.len());
        for s in &sums {
            let Some(&count) = self.counts.get(s.reg.index()) else {
                return Err(RenameError::RegOutOfRange {
                    class: RegClass::Int,
                    reg: s.reg,
                    size: self.counts.len(),
                });
            };
            let raised = u32::from(count) + s.inc;
            if raised < s.dec {
                tracing::error!(reg = %s.reg, count, released = s.dec, "reference count underflow");
                return Err(RenameError::RefCountUnderflow {
                    reg: s.reg,
                    count,
                    released: s.dec,
                });
            }
            let Ok(value) = u16::try_from(raised - s.dec) else {
                return Err(RenameError::RefCountOverflow(s.reg));
            };
            next.push(value);
        }

        let mut freed = Vec::new();
        for (s, value) in sums.iter().zip(next) {
            self.counts[s.reg.index()] = value;
            if s.dec > 0 && value == 0 {
                freed.push(s.reg);
            }
        }
        Ok(FreedRegs(freed))
    }

    /// Records new references only.
    ///
    /// # Errors
    ///
    /// See [`RefCounter::tick`].
    pub fn allocate(&mut self, ports: &[Option<PhysReg>]) -> Result<(), RenameError> {
        self.tick(ports, &[]).map(|_| ())
    }

    /// Retires references only.
    ///
    /// # Errors
    ///
    /// See [`RefCounter::tick`].
    pub fn deallocate(&mut self, ports: &[Option<PhysReg>]) -> Result<FreedRegs, RenameError> {
        self.tick(&[], ports)
    }
}
