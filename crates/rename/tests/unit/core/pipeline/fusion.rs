//! # Rename-Time Rewrite Tests
//!
//! Covers lui-load fusion end to end, plus the fence and software prefetch
//! rewrites applied to every renamed micro-op.

use pretty_assertions::assert_eq;
use rvsim_rename::common::PhysReg;
use rvsim_rename::config::Config;
use rvsim_rename::core::pipeline::rename::fusion::lui_imm_of;
use rvsim_rename::core::pipeline::signals::{FuType, LsuOp, SelImm, SrcType};

use crate::common::builder::uop::{UopBuilder, add, fence, fld, ld, lui};
use crate::common::harness::{TestContext, small_config};

// ══════════════════════════════════════════════════════════
// Lui-load fusion
// ══════════════════════════════════════════════════════════

/// `lui x5, 0x12345; ld x6, 0x7ff(x5)` on 8-bit register ids.
#[test]
fn lui_load_fuses_immediate() {
    let mut ctx = TestContext::with_config(&Config::default());
    let out = ctx.rename(&[lui(5, 0x12345), ld(6, 5, 0x7ff)]);
    let load = out.uops[1];

    assert!(load.lui_fused);
    assert_eq!(load.ctrl.src_type[0], SrcType::Imm);
    assert_eq!(load.ctrl.imm, 0x457ff);
    assert_eq!(load.psrc, [PhysReg(0x23), PhysReg(0x1), PhysReg(0)]);
    assert_eq!(lui_imm_of(&load, 8), 0x12345);

    // Both still get their own destinations.
    assert_eq!(out.uops[0].pdest, PhysReg(32));
    assert_eq!(load.pdest, PhysReg(33));
    assert!(!out.uops[0].lui_fused);
    assert_eq!(ctx.driver.stats.lui_loads_fused, 1);
}

/// Floating-point loads use an integer base and fuse the same way.
#[test]
fn fp_load_fuses() {
    let mut ctx = TestContext::with_config(&Config::default());
    let out = ctx.rename(&[lui(7, 0xabcde), fld(2, 7, 0x10)]);
    assert!(out.uops[1].lui_fused);
    assert_eq!(lui_imm_of(&out.uops[1], 8), 0xabcde);
    assert_eq!(out.uops[1].ctrl.imm & 0xfff, 0x10);
}

/// Register ids narrower than eight bits spill into the second source slot.
#[test]
fn narrow_ids_spill_into_second_slot() {
    let mut ctx = TestContext::new();
    let width = ctx.driver.rename.config().int_psrc_width();
    assert_eq!(width, 6);

    let out = ctx.rename(&[lui(5, 0xfffff), ld(6, 5, 0)]);
    assert_eq!(out.uops[1].psrc, [PhysReg(0x3f), PhysReg(0x3f), PhysReg(0)]);
    assert_eq!(lui_imm_of(&out.uops[1], width), 0xfffff);
}

/// Fusion needs the load directly after the lui, in the same batch, on its destination.
#[test]
fn fusion_requires_adjacent_dependent_load() {
    let mut ctx = TestContext::new();

    let out = ctx.rename(&[lui(5, 1), add(1, 0, 0), ld(6, 5, 0)]);
    assert!(!out.uops[2].lui_fused);
    assert_eq!(out.uops[2].psrc[0], PhysReg(32));

    let out = ctx.rename(&[lui(5, 1), ld(6, 7, 0)]);
    assert!(!out.uops[1].lui_fused);

    let out = ctx.rename(&[ld(2, 0, 0), lui(5, 1)]);
    assert!(!out.uops[1].lui_fused);
    let out = ctx.rename(&[ld(6, 5, 0)]);
    assert!(!out.uops[0].lui_fused);
    assert_eq!(out.uops[0].ctrl.src_type[0], SrcType::Reg);
}

/// A lui to `x0` produces nothing to fold.
#[test]
fn lui_to_x0_not_fused() {
    let mut ctx = TestContext::new();
    let out = ctx.rename(&[lui(0, 0x12345), ld(6, 0, 8)]);
    assert!(!out.uops[1].lui_fused);
    assert_eq!(out.uops[1].ctrl.imm, 8);
}

/// Disabling the feature leaves the load on its register base.
#[test]
fn fusion_disabled() {
    let mut config = small_config();
    config.features.lui_load_fusion = false;
    let mut ctx = TestContext::with_config(&config);
    let out = ctx.rename(&[lui(5, 0x12345), ld(6, 5, 0x7ff)]);
    assert!(!out.uops[1].lui_fused);
    assert_eq!(out.uops[1].psrc[0], PhysReg(32));
    assert_eq!(out.uops[1].ctrl.imm, 0x7ff);
}

// ══════════════════════════════════════════════════════════
// Fence and prefetch
// ══════════════════════════════════════════════════════════

/// Fences carry their ordering sets in the immediate.
#[test]
fn fence_packs_ordering_sets() {
    let mut ctx = TestContext::new();
    let out = ctx.rename(&[fence(0b0011, 0b1111)]);
    assert_eq!(out.uops[0].ctrl.fu_type, FuType::Fence);
    assert_eq!(out.uops[0].ctrl.imm, (0b1111 << 5) | 0b0011);
    assert_eq!(ctx.int_free().len(), 8);
    assert_eq!(ctx.driver.stats.fences, 1);
}

/// A prefetch hint becomes a load-unit prefetch and never fuses.
#[test]
fn soft_prefetch_rewritten() {
    let mut ctx = TestContext::new();
    let prefetch = |kind: u8| {
        UopBuilder::new()
            .src(0, SrcType::Reg, 5)
            .src(1, SrcType::Imm, kind)
            .fu(FuType::Alu)
            .imm(SelImm::I, 0x7e3)
            .soft_prefetch()
            .lane()
    };
    let out = ctx.rename(&[lui(5, 0x10), prefetch(1), prefetch(3)]);

    let read = out.uops[1];
    assert_eq!(read.ctrl.fu_type, FuType::Ldu);
    assert_eq!(read.ctrl.lsu_op, LsuOp::PrefetchR);
    assert_eq!(read.ctrl.sel_imm, SelImm::S);
    assert_eq!(read.ctrl.imm, 0x7e0);
    assert!(!read.lui_fused);
    assert_eq!(read.psrc[0], PhysReg(32));

    assert_eq!(out.uops[2].ctrl.lsu_op, LsuOp::PrefetchW);
    assert_eq!(ctx.driver.stats.soft_prefetches, 2);
}
