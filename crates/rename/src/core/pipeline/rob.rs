//! Reorder Buffer model driving commit and walk.
//!
//! The buffer is a ring indexed by the same sequence pointers the rename
//! stage hands out. It provides:
//! 1. **Enqueue:** Accepts renamed micro-ops strictly in sequence order.
//! 2. **Commit:** Retires the oldest entries, reporting what they displaced.
//! 3. **Redirect:** Marks every entry younger than a mispredicted one as squashed.
//! 4. **Walk:** Pops squashed entries youngest first so rename can undo them.
//!
//! Entries carry only what recovery needs; execution state lives elsewhere.

use crate::common::error::RenameError;
use crate::common::ptr::{CircularPtr, distance_between, is_before};
use crate::core::pipeline::latches::{CommitInfo, Redirect, RenamedUop};

/// A single entry in the reorder buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobEntry {
    /// Sequence index assigned at rename.
    pub rob_idx: CircularPtr,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Mapping installed and displaced by the micro-op.
    pub info: CommitInfo,
}

/// Reorder buffer: circular log of renamed micro-ops.
#[derive(Clone, Debug)]
pub struct Rob {
    slots: Vec<Option<RobEntry>>,
    /// Oldest entry (commit point).
    head: CircularPtr,
    /// Where the next entry is enqueued.
    tail: CircularPtr,
    /// Walking pops entries until `tail` reaches this pointer.
    walk_to: Option<CircularPtr>,
}

impl Rob {
    /// Creates an empty buffer with `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            head: CircularPtr::new(capacity),
            tail: CircularPtr::new(capacity),
            walk_to: None,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        distance_between(self.tail, self.head)
    }

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Returns the number of free slots.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Oldest entry pointer.
    #[inline]
    pub const fn head(&self) -> CircularPtr {
        self.head
    }

    /// Next enqueue pointer.
    #[inline]
    pub const fn tail(&self) -> CircularPtr {
        self.tail
    }

    /// Returns true while squashed entries remain to be walked.
    #[inline]
    pub const fn is_walking(&self) -> bool {
        self.walk_to.is_some()
    }

    /// Entry at sequence index `idx`, if occupied.
    pub fn entry(&self, idx: CircularPtr) -> Option<&RobEntry> {
        self.slots[idx.value()]
            .as_ref()
            .filter(|e| e.rob_idx == idx)
    }

    /// Iterates over occupied entries from oldest to youngest.
    pub fn iter(&self) -> impl Iterator<Item = &RobEntry> + '_ {
        (0..self.len()).filter_map(move |k| self.slots[(self.head + k).value()].as_ref())
    }

    /// Appends an accepted batch.
    ///
    /// # Errors
    ///
    /// [`RenameError::RobOverflow`] when the batch does not fit and
    /// [`RenameError::RobIndexMismatch`] when a micro-op's index is not the next
    /// slot. Nothing is enqueued on error.
    pub fn enqueue(&mut self, uops: &[RenamedUop]) -> Result<(), RenameError> {
        if uops.len() > self.free_slots() {
            return Err(RenameError::RobOverflow {
                incoming: uops.len(),
                free: self.free_slots(),
            });
        }
        for (k, uop) in uops.iter().enumerate() {
            let expected = self.tail + k;
            if uop.rob_idx != expected {
                tracing::error!(
                    expected = expected.value(),
                    got = uop.rob_idx.value(),
                    "rob index mismatch"
                );
                return Err(RenameError::RobIndexMismatch {
                    expected: expected.value(),
                    got: uop.rob_idx.value(),
                });
            }
        }
        for uop in uops {
            self.slots[self.tail.value()] = Some(RobEntry {
                rob_idx: uop.rob_idx,
                pc: uop.pc,
                info: uop.commit_info(),
            });
            self.tail = self.tail + 1;
        }
        Ok(())
    }

    /// Retires up to `n` of the oldest entries, oldest first.
    ///
    /// Nothing retires while a walk is pending.
    pub fn commit(&mut self, n: usize) -> Vec<CommitInfo> {
        if self.is_walking() {
            return Vec::new();
        }
        let count = n.min(self.len());
        let mut infos = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(entry) = self.slots[self.head.value()].take() {
                infos.push(entry.info);
            }
            self.head = self.head + 1;
        }
        infos
    }

    /// Squashes every entry from the redirect's flush point onward.
    ///
    /// A redirect inside a region that is already being walked leaves the
    /// older boundary in place.
    ///
    /// # Errors
    ///
    /// [`RenameError::RedirectOutOfRange`] when the flush point is not between
    /// `head` and `tail`.
    pub fn redirect(&mut self, redirect: &Redirect) -> Result<(), RenameError> {
        let start = redirect.flush_from();
        if !(0..=self.len()).any(|k| self.head + k == start) {
            return Err(RenameError::RedirectOutOfRange {
                rob_idx: start.value(),
            });
        }
        let boundary = match self.walk_to {
            Some(w) if is_before(w, start) => w,
            _ => start,
        };
        self.walk_to = (boundary != self.tail).then_some(boundary);
        tracing::debug!(
            flush_from = start.value(),
            squashed = distance_between(self.tail, boundary),
            "rob redirect"
        );
        Ok(())
    }

    /// Returns true when a pending walk already squashes everything
    /// `redirect` would flush.
    pub fn is_superseded(&self, redirect: &Redirect) -> bool {
        self.walk_to.is_some_and(|w| !is_before(redirect.flush_from(), w))
    }

    /// Pops up to `n` squashed entries, youngest first.
    pub fn walk(&mut self, n: usize) -> Vec<CommitInfo> {
        let Some(boundary) = self.walk_to else {
            return Vec::new();
        };
        let mut infos = Vec::with_capacity(n);
        while infos.len() < n && self.tail != boundary {
            self.tail = self.tail - 1;
            if let Some(entry) = self.slots[self.tail.value()].take() {
                infos.push(entry.info);
            }
        }
        if self.tail == boundary {
            self.walk_to = None;
        }
        infos
    }
}
