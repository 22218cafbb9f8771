//! Circular Queue Pointers.
//!
//! A `CircularPtr` indexes a fixed-capacity ring buffer. It pairs a `value` in
//! `[0, entries)` with a wrap `flag`, so two pointers with the same `value` but
//! different flags are exactly one full ring apart. This module provides:
//! 1. **Arithmetic:** Advancing and retreating by a delta modulo the capacity.
//! 2. **Occupancy:** Empty/full tests and the distance between an enqueue and dequeue pointer.
//! 3. **Ordering:** Wrap-aware before/after comparisons.
//!
//! Capacities need not be powers of two. Callers never move a pointer by more
//! than `entries` in one step.

use std::ops::{Add, Sub};

/// Wrap-around index into a ring buffer of `entries` slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CircularPtr {
    flag: bool,
    value: usize,
    entries: usize,
}

impl CircularPtr {
    /// Creates the reset pointer `(false, 0)` for a ring of `entries` slots.
    pub fn new(entries: usize) -> Self {
        debug_assert!(entries > 0, "circular pointer over an empty ring");
        Self {
            flag: false,
            value: 0,
            entries,
        }
    }

    /// Creates a pointer from its raw parts.
    pub fn from_parts(entries: usize, flag: bool, value: usize) -> Self {
        debug_assert!(value < entries, "pointer value {value} out of range {entries}");
        Self {
            flag,
            value,
            entries,
        }
    }

    /// Wrap flag.
    #[inline(always)]
    pub const fn flag(self) -> bool {
        self.flag
    }

    /// Slot index in `[0, entries)`.
    #[inline(always)]
    pub const fn value(self) -> usize {
        self.value
    }

    /// Ring capacity.
    #[inline(always)]
    pub const fn entries(self) -> usize {
        self.entries
    }

    /// Moves the pointer forward by `delta` slots.
    ///
    /// Power-of-two rings treat `{flag, value}` as one binary counter so the
    /// carry out of `value` flips `flag`. Other rings compare the raw sum
    /// against the capacity and wrap explicitly.
    pub fn advance(self, delta: usize) -> Self {
        if self.entries.is_power_of_two() {
            let bits = self.entries.trailing_zeros();
            let raw = (usize::from(self.flag) << bits) | self.value;
            let sum = raw.wrapping_add(delta) & ((self.entries << 1) - 1);
            Self {
                flag: (sum >> bits) & 1 == 1,
                value: sum & (self.entries - 1),
                entries: self.entries,
            }
        } else {
            debug_assert!(
                delta <= self.entries,
                "advance by {delta} exceeds ring of {}",
                self.entries
            );
            let raw = self.value + delta;
            let diff = raw as isize - self.entries as isize;
            if diff >= 0 {
                Self {
                    flag: !self.flag,
                    value: diff as usize,
                    entries: self.entries,
                }
            } else {
                Self {
                    flag: self.flag,
                    value: raw,
                    entries: self.entries,
                }
            }
        }
    }

    /// Moves the pointer backward by `delta` slots.
    ///
    /// Computed as an advance by the complement `entries - delta` followed by a
    /// flag inversion.
    pub fn retreat(self, delta: usize) -> Self {
        debug_assert!(
            delta <= self.entries,
            "retreat by {delta} exceeds ring of {}",
            self.entries
        );
        let moved = self.advance(self.entries - delta);
        Self {
            flag: !moved.flag,
            ..moved
        }
    }
}

impl Add<usize> for CircularPtr {
    type Output = Self;

    fn add(self, delta: usize) -> Self {
        self.advance(delta)
    }
}

impl Sub<usize> for CircularPtr {
    type Output = Self;

    fn sub(self, delta: usize) -> Self {
        self.retreat(delta)
    }
}

/// Returns true when the ring between `deq` and `enq` holds nothing.
#[inline]
pub fn is_empty(enq: CircularPtr, deq: CircularPtr) -> bool {
    enq == deq
}

/// Returns true when `enq` has wrapped exactly once more than `deq`.
#[inline]
pub fn is_full(enq: CircularPtr, deq: CircularPtr) -> bool {
    debug_assert_eq!(enq.entries, deq.entries, "comparing pointers of different rings");
    enq.flag != deq.flag && enq.value == deq.value
}

/// Number of slots between `deq` (inclusive) and `enq` (exclusive).
#[inline]
pub fn distance_between(enq: CircularPtr, deq: CircularPtr) -> usize {
    debug_assert_eq!(enq.entries, deq.entries, "comparing pointers of different rings");
    if enq.flag == deq.flag {
        enq.value - deq.value
    } else {
        enq.entries + enq.value - deq.value
    }
}

/// Returns true when `left` is strictly later in ring order than `right`.
#[inline]
pub fn is_after(left: CircularPtr, right: CircularPtr) -> bool {
    debug_assert_eq!(left.entries, right.entries, "comparing pointers of different rings");
    (left.flag != right.flag) ^ (left.value > right.value)
}

/// Returns true when `left` is strictly earlier in ring order than `right`.
#[inline]
pub fn is_before(left: CircularPtr, right: CircularPtr) -> bool {
    debug_assert_eq!(left.entries, right.entries, "comparing pointers of different rings");
    (left.flag != right.flag) ^ (left.value < right.value)
}
