//! Physical Register Free Lists.
//!
//! A free list is a ring of physical register ids that no architectural name
//! currently maps to. Allocation dequeues from `head`, reclamation enqueues at
//! `tail`, and a walk rewinds `head` over the most recent allocations. This
//! module provides:
//! 1. **Shared Ring:** `FreeRing`, the storage and pointer discipline common to both variants.
//! 2. **Common Contract:** The `FreeList` trait used by the rename orchestrator.
//! 3. **Variants:** `StdFreeList` (direct frees, floating point) and `MeFreeList`
//!    (frees gated by a reference counter, integer with move elimination).
//!
//! Allocation is all-or-nothing per cycle: lane `i` is handed the `k`-th free
//! id, where `k` is the number of requesting lanes before it, and either every
//! requesting lane receives an id or nothing is dequeued.

/// Move-elimination free list.
pub mod me;

/// Standard free list.
pub mod standard;

pub use me::MeFreeList;
pub use standard::StdFreeList;

use crate::common::error::RenameError;
use crate::common::ptr::{CircularPtr, distance_between};
use crate::common::reg::{PhysReg, RegClass};

/// Ring storage shared by both free-list variants.
///
/// Slots in `[head, tail)` hold free ids. Slots in `[tail, head)` hold the ids
/// most recently handed out, in allocation order, which is what lets a walk
/// rewind `head` without any log.
#[derive(Clone, Debug)]
pub struct FreeRing {
    class: RegClass,
    slots: Vec<PhysReg>,
    head: CircularPtr,
    tail: CircularPtr,
    /// Membership bitmap over the whole physical pool.
    is_free: Vec<bool>,
}

impl FreeRing {
    /// Creates a ring of `capacity` slots over a pool of `pool_size` ids,
    /// initially holding `initial` in order.
    ///
    /// # Panics
    ///
    /// Panics if `initial` holds more ids than `capacity`, repeats an id, or
    /// names an id outside the pool. These are construction-time programming errors.
    pub fn new(
        class: RegClass,
        capacity: usize,
        pool_size: usize,
        initial: impl IntoIterator<Item = PhysReg>,
    ) -> Self {
        let mut slots = vec![PhysReg::default(); capacity];
        let mut is_free = vec![false; pool_size];
        let mut count = 0;
        for reg in initial {
            assert!(count < capacity, "{class} free list initialised beyond capacity {capacity}");
            assert!(reg.index() < pool_size, "{reg} outside {class} pool of {pool_size}");
            assert!(!is_free[reg.index()], "{reg} listed twice in {class} free list");
            slots[count] = reg;
            is_free[reg.index()] = true;
            count += 1;
        }
        let head = CircularPtr::new(capacity);
        Self {
            class,
            slots,
            head,
            tail: head + count,
            is_free,
        }
    }

    /// Register class served by this ring.
    #[inline]
    pub const fn class(&self) -> RegClass {
        self.class
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of physical ids the ring indexes.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.is_free.len()
    }

    /// Dequeue pointer.
    #[inline]
    pub const fn head(&self) -> CircularPtr {
        self.head
    }

    /// Enqueue pointer.
    #[inline]
    pub const fn tail(&self) -> CircularPtr {
        self.tail
    }

    /// Number of free ids.
    #[inline]
    pub fn free_count(&self) -> usize {
        distance_between(self.tail, self.head)
    }

    /// Returns true when `reg` is currently free.
    #[inline]
    pub fn contains(&self, reg: PhysReg) -> bool {
        self.is_free.get(reg.index()).copied().unwrap_or(false)
    }

    /// Free ids in allocation order.
    pub fn free_regs(&self) -> Vec<PhysReg> {
        (0..self.free_count())
            .map(|k| self.slots[(self.head + k).value()])
            .collect()
    }

    /// Ids handed out by the last `steps` allocations, oldest first.
    pub fn rewound(&self, steps: usize) -> Vec<PhysReg> {
        let start = self.head - steps;
        (0..steps).map(|k| self.slots[(start + k).value()]).collect()
    }

    /// Ids each requesting lane would receive if the batch were allocated now.
    ///
    /// A lane past the end of the free ids gets `None`.
    pub fn peek(&self, req: &[bool]) -> Vec<Option<PhysReg>> {
        let free = self.free_count();
        let mut offset = 0;
        req.iter()
            .map(|&wants| {
                if !wants {
                    return None;
                }
                let k = offset;
                offset += 1;
                (k < free).then(|| self.slots[(self.head + k).value()])
            })
            .collect()
    }

    pub(crate) fn allocate(&mut self, req: &[bool]) -> Result<Vec<Option<PhysReg>>, RenameError> {
        let requested = req.iter().filter(|&&r| r).count();
        let available = self.free_count();
        if requested > available {
            return Err(RenameError::FreeListExhausted {
                class: self.class,
                requested,
                available,
            });
        }
        let regs = self.peek(req);
        for reg in regs.iter().flatten() {
            self.is_free[reg.index()] = false;
        }
        self.head = self.head + requested;
        tracing::trace!(class = %self.class, requested, free = self.free_count(), "allocate");
        Ok(regs)
    }

    pub(crate) fn free(&mut self, regs: &[PhysReg]) -> Result<(), RenameError> {
        let free = self.free_count();
        if free + regs.len() > self.capacity() {
            return Err(RenameError::FreeListOverflow {
                class: self.class,
                free,
                incoming: regs.len(),
                capacity: self.capacity(),
            });
        }
        for (i, &reg) in regs.iter().enumerate() {
            if reg.index() >= self.pool_size() {
                return Err(RenameError::RegOutOfRange {
                    class: self.class,
                    reg,
                    size: self.pool_size(),
                });
            }
            if self.is_free[reg.index()] || regs[..i].contains(&reg) {
                return Err(RenameError::DoubleFree {
                    class: self.class,
                    reg,
                });
            }
        }
        for &reg in regs {
            self.slots[self.tail.value()] = reg;
            self.is_free[reg.index()] = true;
            self.tail = self.tail + 1;
        }
        if !regs.is_empty() {
            tracing::trace!(class = %self.class, freed = regs.len(), free = self.free_count(), "free");
        }
        Ok(())
    }

    pub(crate) fn step_back(&mut self, steps: usize) -> Result<(), RenameError> {
        let allocated = self.capacity() - self.free_count();
        if steps > allocated {
            return Err(RenameError::StepBackUnderflow {
                class: self.class,
                steps,
                allocated,
            });
        }
        let rewound = self.rewound(steps);
        if let Some(&reg) = rewound.iter().find(|r| self.is_free[r.index()]) {
            return Err(RenameError::DoubleFree {
                class: self.class,
                reg,
            });
        }
        for reg in rewound {
            self.is_free[reg.index()] = true;
        }
        self.head = self.head - steps;
        if steps > 0 {
            tracing::trace!(class = %self.class, steps, free = self.free_count(), "step back");
        }
        Ok(())
    }
}

/// Allocation-side contract shared by both free-list variants.
pub trait FreeList {
    /// Shared ring storage.
    fn ring(&self) -> &FreeRing;

    /// Dequeues one id per requesting lane.
    ///
    /// # Errors
    ///
    /// [`RenameError::FreeListExhausted`] when fewer ids are free than lanes
    /// request; nothing is dequeued in that case.
    fn allocate(&mut self, req: &[bool]) -> Result<Vec<Option<PhysReg>>, RenameError>;

    /// Rewinds `head` over the last `steps` allocations.
    ///
    /// # Errors
    ///
    /// [`RenameError::StepBackUnderflow`] when fewer than `steps` slots are allocated.
    fn step_back(&mut self, steps: usize) -> Result<(), RenameError>;

    /// Register class served by this list.
    fn class(&self) -> RegClass {
        self.ring().class()
    }

    /// Number of ring slots.
    fn capacity(&self) -> usize {
        self.ring().capacity()
    }

    /// Number of free ids.
    fn free_count(&self) -> usize {
        self.ring().free_count()
    }

    /// Returns true when `requested` ids can be handed out this cycle.
    fn can_allocate(&self, requested: usize) -> bool {
        self.free_count() >= requested
    }

    /// Ids each requesting lane would receive this cycle.
    fn peek(&self, req: &[bool]) -> Vec<Option<PhysReg>> {
        self.ring().peek(req)
    }

    /// Dequeue pointer.
    fn head(&self) -> CircularPtr {
        self.ring().head()
    }

    /// Enqueue pointer.
    fn tail(&self) -> CircularPtr {
        self.ring().tail()
    }

    /// Free ids in allocation order.
    fn free_regs(&self) -> Vec<PhysReg> {
        self.ring().free_regs()
    }

    /// Returns true when `reg` is currently free.
    fn contains(&self, reg: PhysReg) -> bool {
        self.ring().contains(reg)
    }
}
