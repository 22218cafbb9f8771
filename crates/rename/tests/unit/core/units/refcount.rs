//! # Reference Counter Tests
//!
//! Verifies the counting rules behind move elimination: summed same-cycle
//! ports, release exactly at zero, and underflow detection.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rvsim_rename::common::{PhysReg, RenameError};
use rvsim_rename::core::units::refcount::RefCounter;

/// The architectural registers start with one reference each.
#[test]
fn reset_counts_arch_registers() {
    let rc = RefCounter::new(40);
    assert_eq!(rc.size(), 40);
    assert_eq!(rc.referenced(), 32);
    assert_eq!(rc.count(PhysReg(31)), 1);
    assert_eq!(rc.count(PhysReg(32)), 0);
}

/// A register shared by a producer and an eliminated move survives the first release.
#[test]
fn shared_register_released_by_last_mapping() {
    let mut rc = RefCounter::new(40);
    rc.allocate(&[Some(PhysReg(32)), Some(PhysReg(32))]).unwrap();
    assert_eq!(rc.count(PhysReg(32)), 2);

    assert!(rc.deallocate(&[Some(PhysReg(32))]).unwrap().is_empty());
    let freed = rc.deallocate(&[Some(PhysReg(32))]).unwrap();
    assert_eq!(freed.as_slice(), &[PhysReg(32)]);
}

/// Same-cycle ports are summed per register: an over-release fails as a whole,
/// and a register released to zero by two ports is reported once.
#[test]
fn same_cycle_release_reported_once() {
    let mut rc = RefCounter::new(40);
    rc.allocate(&[Some(PhysReg(33))]).unwrap();
    let err = rc
        .deallocate(&[Some(PhysReg(33)), Some(PhysReg(2)), Some(PhysReg(33))])
        .unwrap_err();
    assert_eq!(
        err,
        RenameError::RefCountUnderflow {
            reg: PhysReg(33),
            count: 1,
            released: 2,
        }
    );

    rc.allocate(&[Some(PhysReg(33))]).unwrap();
    let freed = rc.deallocate(&[Some(PhysReg(33)), Some(PhysReg(33))]).unwrap();
    assert_eq!(freed.len(), 1);
    assert_eq!(rc.count(PhysReg(2)), 1);
}

/// A release and a new reference in the same cycle cancel out and free nothing.
#[test]
fn concurrent_allocate_and_release_cancel() {
    let mut rc = RefCounter::new(40);
    let freed = rc.tick(&[Some(PhysReg(4))], &[Some(PhysReg(4))]).unwrap();
    assert!(freed.is_empty());
    assert_eq!(rc.count(PhysReg(4)), 1);
}

/// Ids outside the pool are rejected.
#[test]
fn out_of_range_rejected() {
    let mut rc = RefCounter::new(40);
    assert!(matches!(
        rc.allocate(&[Some(PhysReg(40))]),
        Err(RenameError::RegOutOfRange { .. })
    ));
}

proptest! {
    /// Against a plain model: counts never go negative, an underflowing cycle
    /// changes nothing, and a register is released exactly when a release
    /// brings it to zero.
    #[test]
    fn counts_track_model(ops in prop::collection::vec((any::<bool>(), 0u16..8), 1..200)) {
        let mut rc = RefCounter::new(8);
        let mut model = rc.counts().to_vec();

        for (inc, id) in ops {
            let reg = PhysReg(id);
            let i = usize::from(id);
            if inc {
                rc.allocate(&[Some(reg)]).unwrap();
                model[i] += 1;
                continue;
            }
            match rc.deallocate(&[Some(reg)]) {
                Ok(freed) => {
                    prop_assert!(model[i] > 0);
                    model[i] -= 1;
                    prop_assert_eq!(freed.as_slice().contains(&reg), model[i] == 0);
                }
                Err(RenameError::RefCountUnderflow { .. }) => prop_assert_eq!(model[i], 0),
                Err(e) => prop_assert!(false, "unexpected error {e}"),
            }
            prop_assert_eq!(rc.counts(), model.as_slice());
        }
    }
}
