//! # Free List Tests
//!
//! Exercises both free-list variants through the shared `FreeList` contract:
//! whole-batch allocation, same-cycle reuse of freed registers, walk rewind,
//! and the error paths that must leave the list untouched.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvsim_rename::common::{PhysReg, RegClass, RenameError};
use rvsim_rename::core::units::freelist::{FreeList, FreeRing, MeFreeList, StdFreeList};
use rvsim_rename::core::units::refcount::RefCounter;

fn regs(ids: &[u16]) -> Vec<PhysReg> {
    ids.iter().copied().map(PhysReg).collect()
}

// ══════════════════════════════════════════════════════════
// Reset state
// ══════════════════════════════════════════════════════════

/// The standard list holds every id above the architectural registers, in order.
#[rstest]
#[case(40)]
#[case(64)]
#[case(192)]
fn standard_reset_holds_pool_above_arch(#[case] phys: usize) {
    let fl = StdFreeList::new(RegClass::Fp, phys);
    assert_eq!(fl.capacity(), phys - 32);
    assert_eq!(fl.free_count(), phys - 32);
    let expected: Vec<PhysReg> = (32..phys).map(|i| PhysReg(i as u16)).collect();
    assert_eq!(fl.free_regs(), expected);
    assert_eq!(fl.class(), RegClass::Fp);
}

/// The move-elimination ring spans the whole pool but starts with the same ids free.
#[rstest]
#[case(40)]
#[case(192)]
fn me_reset_spans_whole_pool(#[case] phys: usize) {
    let fl = MeFreeList::new(phys);
    assert_eq!(fl.capacity(), phys);
    assert_eq!(fl.free_count(), phys - 32);
    assert_eq!(fl.class(), RegClass::Int);
    assert!(!fl.contains(PhysReg(0)));
    assert!(fl.contains(PhysReg(32)));
}

// ══════════════════════════════════════════════════════════
// Allocation
// ══════════════════════════════════════════════════════════

/// Requesting lanes take consecutive ids; idle lanes take nothing.
#[test]
fn allocation_skips_idle_lanes() {
    let mut fl = StdFreeList::new(RegClass::Fp, 40);
    let got = fl.allocate(&[true, false, true, false]).unwrap();
    assert_eq!(got, vec![Some(PhysReg(32)), None, Some(PhysReg(33)), None]);
    assert_eq!(fl.free_count(), 6);
    assert!(!fl.contains(PhysReg(32)));
}

/// Peeking reports the same ids an allocation would return without consuming them.
#[test]
fn peek_does_not_consume() {
    let mut fl = MeFreeList::new(40);
    let req = [false, true, true];
    let peeked = fl.peek(&req);
    assert_eq!(fl.free_count(), 8);
    assert_eq!(fl.allocate(&req).unwrap(), peeked);
}

/// A batch larger than the free ids is refused as a whole.
#[test]
fn short_list_refuses_whole_batch() {
    let mut fl = StdFreeList::new(RegClass::Fp, 34);
    assert!(fl.can_allocate(2));
    assert!(!fl.can_allocate(3));
    let err = fl.allocate(&[true, true, true]).unwrap_err();
    assert_eq!(
        err,
        RenameError::FreeListExhausted {
            class: RegClass::Fp,
            requested: 3,
            available: 2,
        }
    );
    assert_eq!(fl.free_regs(), regs(&[32, 33]));
}

// ══════════════════════════════════════════════════════════
// Reclamation
// ══════════════════════════════════════════════════════════

/// Freed registers queue behind the existing free ids.
#[test]
fn freed_registers_are_reused_fifo() {
    let mut fl = StdFreeList::new(RegClass::Fp, 36);
    let _ = fl.allocate(&[true, true, true, true]).unwrap();
    assert_eq!(fl.free_count(), 0);

    fl.free(&regs(&[5, 9])).unwrap();
    assert_eq!(fl.free_regs(), regs(&[5, 9]));
    assert_eq!(fl.allocate(&[true]).unwrap(), vec![Some(PhysReg(5))]);
}

/// Returning a register that is already free is rejected without enqueuing anything.
#[test]
fn double_free_rejected() {
    let mut fl = StdFreeList::new(RegClass::Fp, 36);
    let _ = fl.allocate(&[true, true]).unwrap();
    let err = fl.free(&regs(&[3, 34])).unwrap_err();
    assert_eq!(
        err,
        RenameError::DoubleFree {
            class: RegClass::Fp,
            reg: PhysReg(34),
        }
    );
    assert_eq!(fl.free_count(), 2);
    assert!(!fl.contains(PhysReg(3)));
}

/// The move-elimination list only takes back what the reference counter released.
#[test]
fn me_reclaims_counter_releases() {
    let mut fl = MeFreeList::new(40);
    let mut rc = RefCounter::new(40);

    // x5 committed onto p32, displacing p5.
    let got = fl.allocate(&[true]).unwrap();
    rc.allocate(&got).unwrap();
    let freed = rc.deallocate(&[Some(PhysReg(5))]).unwrap();
    fl.reclaim(&freed).unwrap();

    assert_eq!(freed.as_slice(), regs(&[5]).as_slice());
    assert!(fl.contains(PhysReg(5)));
    assert_eq!(fl.free_count(), 8);
}

// ══════════════════════════════════════════════════════════
// Walk
// ══════════════════════════════════════════════════════════

/// Capacity-8 ring: allocate three, step back three, the ring is as before.
#[test]
fn step_back_restores_allocations() {
    let ring = FreeRing::new(RegClass::Int, 8, 8, regs(&[0, 1, 2, 3, 4, 5, 6, 7]));
    let mut fl = MeFreeList::with_ring(ring);
    let before = fl.head();

    let got = fl.allocate(&[true, true, true]).unwrap();
    assert_eq!(got, vec![Some(PhysReg(0)), Some(PhysReg(1)), Some(PhysReg(2))]);
    assert_eq!(fl.head().value(), 3);

    fl.step_back(3).unwrap();
    assert_eq!(fl.head(), before);
    assert_eq!(fl.free_regs(), regs(&[0, 1, 2, 3, 4, 5, 6, 7]));
}

/// Partial rewinds restore the youngest allocations first.
#[test]
fn partial_step_back_restores_youngest() {
    let mut fl = StdFreeList::new(RegClass::Fp, 40);
    let _ = fl.allocate(&[true, true, true]).unwrap();
    fl.step_back(1).unwrap();
    assert_eq!(fl.free_regs().first(), Some(&PhysReg(34)));
    assert!(fl.contains(PhysReg(34)));
    assert!(!fl.contains(PhysReg(33)));
}

/// A rewind longer than the allocated span is an error and changes nothing.
#[test]
fn step_back_past_allocations_rejected() {
    let mut fl = StdFreeList::new(RegClass::Fp, 40);
    let _ = fl.allocate(&[true]).unwrap();
    let err = fl.step_back(2).unwrap_err();
    assert_eq!(
        err,
        RenameError::StepBackUnderflow {
            class: RegClass::Fp,
            steps: 2,
            allocated: 1,
        }
    );
    assert_eq!(fl.free_count(), 7);
}
