//! Rename statistics collection and reporting.
//!
//! This module tracks performance counters of the rename stage. It provides:
//! 1. **Throughput:** Cycles, cycles with a valid batch, accepted batches, renamed micro-ops.
//! 2. **Stalls:** Held batches broken down by cause.
//! 3. **Allocation:** Registers taken from each free list, eliminated moves, fused loads.
//! 4. **Recovery:** Redirects, walked micro-ops, and registers reclaimed at commit.

use std::time::Instant;

use crate::core::pipeline::latches::{RenameInput, RenameOutput, StallReason};
use crate::core::pipeline::signals::{FuType, LsuOp};

/// Rename statistics structure tracking all performance counters.
#[derive(Clone, Debug)]
pub struct RenameStats {
    start_time: Instant,
    /// Total cycles observed.
    pub cycles: u64,
    /// Cycles in which decode presented at least one valid micro-op.
    pub cycles_valid: u64,
    /// Cycles in which a batch was accepted.
    pub cycles_fired: u64,
    /// Micro-ops renamed.
    pub uops_renamed: u64,

    /// Stall cycles because the reorder buffer was walking.
    pub stalls_walk: u64,
    /// Stall cycles because the integer free list was short.
    pub stalls_int_freelist: u64,
    /// Stall cycles because the fp free list was short.
    pub stalls_fp_freelist: u64,
    /// Stall cycles because dispatch was not ready.
    pub stalls_dispatch: u64,

    /// Integer registers taken from the free list.
    pub int_allocated: u64,
    /// Floating-point registers taken from the free list.
    pub fp_allocated: u64,
    /// Moves renamed without a new register.
    pub moves_eliminated: u64,
    /// Loads fused with a preceding upper-immediate load.
    pub lui_loads_fused: u64,
    /// Fences renamed.
    pub fences: u64,
    /// Software prefetches renamed.
    pub soft_prefetches: u64,

    /// Cycles carrying a redirect.
    pub redirects: u64,
    /// Micro-ops undone by walks.
    pub walked: u64,
    /// Micro-ops retired.
    pub committed: u64,
    /// Integer registers returned to the free list at commit.
    pub int_reclaimed: u64,
    /// Floating-point registers returned to the free list at commit.
    pub fp_reclaimed: u64,
}

impl Default for RenameStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            cycles_valid: 0,
            cycles_fired: 0,
            uops_renamed: 0,
            stalls_walk: 0,
            stalls_int_freelist: 0,
            stalls_fp_freelist: 0,
            stalls_dispatch: 0,
            int_allocated: 0,
            fp_allocated: 0,
            moves_eliminated: 0,
            lui_loads_fused: 0,
            fences: 0,
            soft_prefetches: 0,
            redirects: 0,
            walked: 0,
            committed: 0,
            int_reclaimed: 0,
            fp_reclaimed: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "stalls", "allocation", "recovery"];

impl RenameStats {
    /// Accumulates one cycle of the rename stage.
    pub fn record(&mut self, input: &RenameInput, out: &RenameOutput) {
        self.cycles += 1;
        if input.uops.iter().any(Option::is_some) {
            self.cycles_valid += 1;
        }
        if out.accepted {
            self.cycles_fired += 1;
        }
        match out.stall {
            Some(StallReason::Walk) => self.stalls_walk += 1,
            Some(StallReason::IntFreeList) => self.stalls_int_freelist += 1,
            Some(StallReason::FpFreeList) => self.stalls_fp_freelist += 1,
            Some(StallReason::Dispatch) => self.stalls_dispatch += 1,
            None => {}
        }

        self.uops_renamed += out.uops.len() as u64;
        for uop in &out.uops {
            if uop.eliminated_move {
                self.moves_eliminated += 1;
            } else if uop.ctrl.need_int_dest() {
                self.int_allocated += 1;
            }
            if uop.lui_fused {
                self.lui_loads_fused += 1;
            }
            if uop.ctrl.fu_type == FuType::Fence {
                self.fences += 1;
            }
            if matches!(uop.ctrl.lsu_op, LsuOp::PrefetchR | LsuOp::PrefetchW) {
                self.soft_prefetches += 1;
            }
        }
        self.fp_allocated += out.fp_writes.len() as u64;

        if input.redirect.is_some() {
            self.redirects += 1;
        }
        let retired = input.commits.infos.len() as u64;
        if input.commits.is_walk {
            self.walked += retired;
        } else {
            self.committed += retired;
        }
        self.int_reclaimed += out.int_freed.len() as u64;
        self.fp_reclaimed += out.fp_freed.len() as u64;
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"stalls"`,
    /// `"allocation"`, or `"recovery"`. Pass an empty slice to print all sections
    /// (same as `print()`).
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let pct = |n: u64| (n as f64 / cyc) * 100.0;

        if want("summary") {
            let upc = self.uops_renamed as f64 / cyc;
            println!("\n==========================================================");
            println!("RENAME STAGE STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {:.4} s", seconds);
            println!("rename_cycles            {}", self.cycles);
            println!("rename_valid_cycles      {} ({:.2}%)", self.cycles_valid, pct(self.cycles_valid));
            println!("rename_fired_cycles      {} ({:.2}%)", self.cycles_fired, pct(self.cycles_fired));
            println!("rename_uops              {}", self.uops_renamed);
            println!("rename_upc               {:.4}", upc);
            println!("----------------------------------------------------------");
        }
        if want("stalls") {
            println!("STALLS");
            println!("  stalls.walk            {} ({:.2}%)", self.stalls_walk, pct(self.stalls_walk));
            println!(
                "  stalls.int_freelist    {} ({:.2}%)",
                self.stalls_int_freelist,
                pct(self.stalls_int_freelist)
            );
            println!(
                "  stalls.fp_freelist     {} ({:.2}%)",
                self.stalls_fp_freelist,
                pct(self.stalls_fp_freelist)
            );
            println!(
                "  stalls.dispatch        {} ({:.2}%)",
                self.stalls_dispatch,
                pct(self.stalls_dispatch)
            );
            println!("----------------------------------------------------------");
        }
        if want("allocation") {
            let uops = self.uops_renamed.max(1) as f64;
            println!("ALLOCATION");
            println!("  alloc.int              {}", self.int_allocated);
            println!("  alloc.fp               {}", self.fp_allocated);
            println!(
                "  move.eliminated        {} ({:.2}%)",
                self.moves_eliminated,
                (self.moves_eliminated as f64 / uops) * 100.0
            );
            println!("  fusion.lui_load        {}", self.lui_loads_fused);
            println!("  op.fence               {}", self.fences);
            println!("  op.soft_prefetch       {}", self.soft_prefetches);
            println!("----------------------------------------------------------");
        }
        if want("recovery") {
            println!("RECOVERY");
            println!("  redirects              {}", self.redirects);
            println!("  walked                 {}", self.walked);
            println!("  committed              {}", self.committed);
            println!("  reclaim.int            {}", self.int_reclaimed);
            println!("  reclaim.fp             {}", self.fp_reclaimed);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
