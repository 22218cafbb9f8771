//! # Closed-Loop Driver Tests
//!
//! Runs random programs through decode, rename, commit, redirect and walk,
//! checking register conservation after every cycle.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::sample::Index;
use rvsim_rename::common::PhysReg;
use rvsim_rename::config::Config;
use rvsim_rename::core::pipeline::latches::{DecodedUop, Redirect};

use crate::common::builder::uop::{add, fadd, fence, fld, ld, lui, mv, sd};
use crate::common::harness::{TestContext, small_config};

/// Maps a generated triple onto one of the builder micro-ops.
fn decode(kind: u8, a: u8, b: u8) -> Option<DecodedUop> {
    match kind {
        0 => add(a, b, a),
        1 => mv(a, b),
        2 => fadd(a, b, a),
        3 => lui(a, u32::from(b) << 12),
        4 => ld(a, b, 0x40),
        5 => fld(a, b, 0x8),
        6 => sd(a, b),
        7 => fence(a, b),
        _ => None,
    }
}

/// One cycle of stimulus.
#[derive(Clone, Debug)]
struct Cycle {
    batch: Vec<Option<DecodedUop>>,
    retire: usize,
    redirect: Option<(Index, bool)>,
}

fn cycle() -> impl Strategy<Value = Cycle> {
    (
        prop::collection::vec((0u8..9, 0u8..8, 0u8..8), 0..=4),
        0usize..=4,
        prop::option::weighted(0.1, (any::<Index>(), any::<bool>())),
    )
        .prop_map(|(ops, retire, redirect)| Cycle {
            batch: ops.into_iter().map(|(k, a, b)| decode(k, a, b)).collect(),
            retire,
            redirect,
        })
}

/// Runs `cycles` and drains, checking the invariants after every cycle.
fn run(config: &Config, cycles: &[Cycle]) -> TestContext {
    let mut ctx = TestContext::with_config(config);
    for c in cycles {
        let rob = &ctx.driver.rob;
        // A redirecting micro-op never retires in its own redirect cycle.
        let (redirect, retire) = match c.redirect {
            Some((at, flush_itself)) if !rob.is_empty() => {
                let redirect = Redirect {
                    rob_idx: rob.head() + at.index(rob.len()),
                    flush_itself,
                };
                (Some(redirect), 0)
            }
            _ => (None, c.retire),
        };
        let out = ctx.driver.tick(&c.batch, &[], retire, redirect).unwrap();
        if redirect.is_some() {
            assert!(!out.accepted);
        }
        ctx.check_invariants();
    }
    let _ = ctx.driver.drain().unwrap();
    ctx.check_invariants();
    ctx
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Registers are conserved through any mix of rename, commit and recovery,
    /// and a drained machine holds exactly the architectural mappings.
    #[test]
    fn random_programs_conserve_registers(cycles in prop::collection::vec(cycle(), 1..60)) {
        let ctx = run(&small_config(), &cycles);
        let d = &ctx.driver;

        prop_assert!(d.rob.is_empty());
        prop_assert_eq!(d.int_rat.spec_table(), d.int_rat.arch_table());
        prop_assert_eq!(d.fp_rat.spec_table(), d.fp_rat.arch_table());
        prop_assert_eq!(ctx.fp_free().len(), 8);
        prop_assert_eq!(ctx.int_free().len(), 40 - d.int_rat.distinct_spec());
    }

    /// The same holds with both rename optimizations off.
    #[test]
    fn random_programs_without_features(cycles in prop::collection::vec(cycle(), 1..40)) {
        let mut config = small_config();
        config.features.move_elimination = false;
        config.features.lui_load_fusion = false;
        let ctx = run(&config, &cycles);
        prop_assert_eq!(ctx.int_free().len(), 8);
        prop_assert_eq!(ctx.driver.stats.moves_eliminated, 0);
    }
}

/// Drain on an idle driver takes no cycles.
#[test]
fn drain_idle() {
    let mut ctx = TestContext::new();
    assert_eq!(ctx.driver.drain().unwrap(), 0);
}

/// Long straight-line runs recycle registers through many ring laps.
#[test]
fn steady_state_recycles_registers() {
    let mut ctx = TestContext::new();
    for i in 0..200u32 {
        let rd = (i % 31) as u8 + 1;
        let batch = [add(rd, rd, 0), fadd(rd, rd, rd), mv(31, rd), sd(rd, 31)];
        let out = ctx.driver.tick(&batch, &[], 4, None).unwrap();
        assert!(out.accepted || out.stall.is_some());
        ctx.check_invariants();
    }
    let _ = ctx.driver.drain().unwrap();
    assert_eq!(ctx.fp_free().len(), 8);
    assert!(ctx.driver.stats.cycles_fired > 100);
    assert_eq!(ctx.driver.rename.refcounter().count(PhysReg(0)), 1);
}
