//! Rename and Configuration Errors.
//!
//! The rename stage itself never fails at run time: resource exhaustion becomes
//! backpressure and mispredictions are handled by redirect and walk. What this
//! module reports are the conditions a correct pipeline can never reach:
//! 1. **Invariant Violations:** Reference-count underflow, double frees, ring overflow, bad walks.
//! 2. **Configuration Errors:** Parameter combinations the model cannot represent.
//!
//! A mutation that returns an error leaves the state it was called on unchanged.

use thiserror::Error;

use super::reg::{PhysReg, RegClass};

/// Invariant violation detected while modelling the rename stage.
///
/// Any of these indicates a defect in whatever drives the model (decode,
/// reorder buffer or a test), never an expected runtime condition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenameError {
    /// A deallocation would drive a reference count below zero.
    #[error("reference count underflow on {reg}: count {count}, releasing {released}")]
    RefCountUnderflow {
        /// Register whose count would go negative.
        reg: PhysReg,
        /// Count before this cycle.
        count: u16,
        /// Net references released this cycle.
        released: u32,
    },

    /// An allocation would exceed the reference counter's range.
    #[error("reference count overflow on {0}")]
    RefCountOverflow(PhysReg),

    /// A register was returned to a free list that already holds it.
    #[error("double free of {reg} into the {class} free list")]
    DoubleFree {
        /// Register class of the free list.
        class: RegClass,
        /// Register freed twice.
        reg: PhysReg,
    },

    /// A physical register id is outside the pool.
    #[error("{reg} is outside the {class} pool of {size} registers")]
    RegOutOfRange {
        /// Register class of the pool.
        class: RegClass,
        /// Offending id.
        reg: PhysReg,
        /// Pool size.
        size: usize,
    },

    /// More registers were freed than the ring can hold.
    #[error("{class} free list overflow: {free} free + {incoming} incoming > capacity {capacity}")]
    FreeListOverflow {
        /// Register class of the free list.
        class: RegClass,
        /// Registers already free.
        free: usize,
        /// Registers being returned.
        incoming: usize,
        /// Ring capacity.
        capacity: usize,
    },

    /// An allocation asked for more registers than are free.
    #[error("{class} free list exhausted: requested {requested}, available {available}")]
    FreeListExhausted {
        /// Register class of the free list.
        class: RegClass,
        /// Registers requested this cycle.
        requested: usize,
        /// Registers available.
        available: usize,
    },

    /// A walk tried to rewind past the oldest allocated ring slot.
    #[error("{class} free list step back by {steps} exceeds {allocated} allocated slots")]
    StepBackUnderflow {
        /// Register class of the free list.
        class: RegClass,
        /// Requested rewind.
        steps: usize,
        /// Slots currently allocated.
        allocated: usize,
    },

    /// A walk released a register that is not among the rewound allocations.
    #[error("walk released {0}, which is not among the rewound allocations")]
    WalkMismatch(PhysReg),

    /// A micro-op reached the reorder buffer out of sequence.
    #[error("rob index mismatch: expected {expected}, got {got}")]
    RobIndexMismatch {
        /// Tail slot of the reorder buffer.
        expected: usize,
        /// Slot carried by the micro-op.
        got: usize,
    },

    /// A redirect named a sequence index outside the occupied reorder buffer.
    #[error("redirect to rob index {rob_idx} outside the occupied window")]
    RedirectOutOfRange {
        /// Slot the redirect flushes from.
        rob_idx: usize,
    },

    /// A decode batch has more lanes than the stage renames per cycle.
    #[error("batch of {lanes} lanes exceeds rename width {width}")]
    BatchTooWide {
        /// Lanes presented.
        lanes: usize,
        /// Configured rename width.
        width: usize,
    },

    /// More commit or walk records arrived than the commit width allows.
    #[error("{count} retirement records exceed commit width {width}")]
    TooManyCommits {
        /// Records presented.
        count: usize,
        /// Configured commit width.
        width: usize,
    },

    /// The reorder buffer has no room for the accepted batch.
    #[error("reorder buffer overflow: {incoming} entries, {free} free")]
    RobOverflow {
        /// Entries being enqueued.
        incoming: usize,
        /// Free slots.
        free: usize,
    },
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A width or size parameter is zero.
    #[error("{0} must be non-zero")]
    Zero(&'static str),

    /// A physical register pool cannot back the architectural state plus one batch.
    #[error("{class} pool of {regs} physical registers needs at least {needed}")]
    TooFewPhysRegs {
        /// Register class.
        class: RegClass,
        /// Configured pool size.
        regs: usize,
        /// Minimum pool size.
        needed: usize,
    },

    /// Physical register ids exceed the `u16` id type.
    #[error("{class} pool of {regs} physical registers exceeds the id range")]
    TooManyPhysRegs {
        /// Register class.
        class: RegClass,
        /// Configured pool size.
        regs: usize,
    },

    /// The reorder buffer is smaller than one rename batch.
    #[error("rob of {rob_size} entries is smaller than rename width {width}")]
    RobTooSmall {
        /// Configured ROB size.
        rob_size: usize,
        /// Configured rename width.
        width: usize,
    },

    /// Malformed JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
