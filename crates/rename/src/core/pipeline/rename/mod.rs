//! Rename Stage: physical register allocation, bypass, move elimination, recovery.
//!
//! Each cycle the stage converts a batch of up to `rename_width` decoded
//! micro-ops into micro-ops naming physical registers. It performs:
//! 1. **Reclamation:** Commit returns displaced registers; a walk rewinds the free lists.
//! 2. **Admission:** The whole batch is accepted or none of it (walk, free lists, dispatch).
//! 3. **Allocation:** One free-list id per lane needing a destination; eliminated moves take none.
//! 4. **Bypass:** Later lanes see earlier lanes' destinations instead of stale table reads.
//! 5. **Rewrites:** Lui-load fusion, fence immediate packing, software prefetch.
//! 6. **Table Writes:** Speculative rename-table writes and reference increments for the batch.
//!
//! All next-state values are computed on a copy of the free lists and the
//! reference counter and installed together at the end of the cycle, so a
//! cycle that reports an error leaves the stage untouched. Commit-side updates
//! land before rename-side allocation, which makes a register freed this cycle
//! allocatable in the same cycle.

/// Intra-batch bypass network.
pub mod bypass;

/// Lui-load fusion and other rename-time rewrites.
pub mod fusion;

use crate::common::constants::{NUM_LOOKUPS, NUM_SRCS};
use crate::common::error::{ConfigError, RenameError};
use crate::common::ptr::CircularPtr;
use crate::common::reg::{PhysReg, RegClass};
use crate::config::Config;
use crate::core::pipeline::latches::{
    CommitInfo, DecodedUop, RatWrite, RenameInput, RenameOutput, RenamedUop, StallReason,
};
use crate::core::pipeline::signals::SrcType;
use crate::core::units::freelist::{FreeList, MeFreeList, StdFreeList};
use crate::core::units::refcount::RefCounter;

use self::bypass::{Lookup, WriteClaim};

/// Register bookkeeping owned by the stage.
#[derive(Clone, Debug)]
struct Units {
    int_freelist: MeFreeList,
    fp_freelist: StdFreeList,
    refcount: RefCounter,
}

impl Units {
    /// Normal commit: displaced mappings are released.
    fn retire(&mut self, infos: &[CommitInfo]) -> Result<(Vec<PhysReg>, Vec<PhysReg>), RenameError> {
        let int_ports: Vec<Option<PhysReg>> = infos
            .iter()
            .map(|c| c.need_int_dest().then_some(c.old_pdest))
            .collect();
        let freed = self.refcount.deallocate(&int_ports)?;
        self.int_freelist.reclaim(&freed)?;

        let fp: Vec<PhysReg> = infos.iter().filter(|c| c.fp_wen).map(|c| c.old_pdest).collect();
        self.fp_freelist.free(&fp)?;
        Ok((freed.as_slice().to_vec(), fp))
    }

    /// Walk: speculative mappings are undone and their allocations rewound.
    fn walk(&mut self, infos: &[CommitInfo]) -> Result<(), RenameError> {
        let int_steps = infos.iter().filter(|c| c.allocated_int()).count();
        let fp_steps = infos.iter().filter(|c| c.fp_wen).count();

        let int_ports: Vec<Option<PhysReg>> = infos
            .iter()
            .map(|c| c.need_int_dest().then_some(c.pdest))
            .collect();
        let released = self.refcount.deallocate(&int_ports)?;

        self.int_freelist.step_back(int_steps)?;
        let restored: Vec<PhysReg> = self
            .int_freelist
            .peek(&vec![true; int_steps])
            .into_iter()
            .flatten()
            .collect();
        if let Some(&reg) = released.as_slice().iter().find(|r| !restored.contains(r)) {
            tracing::error!(%reg, int_steps, "walk released a register that was not rewound");
            return Err(RenameError::WalkMismatch(reg));
        }

        self.fp_freelist.step_back(fp_steps)?;
        Ok(())
    }
}

/// Per-lane destination decisions for one batch.
struct LaneNeeds {
    need_int: Vec<bool>,
    need_fp: Vec<bool>,
    is_move: Vec<bool>,
    int_req: Vec<bool>,
}

impl LaneNeeds {
    fn new(lanes: &[Option<DecodedUop>], move_elimination: bool) -> Self {
        let need_int: Vec<bool> = lanes
            .iter()
            .map(|u| u.is_some_and(|u| u.ctrl.need_int_dest()))
            .collect();
        let need_fp = lanes
            .iter()
            .map(|u| u.is_some_and(|u| u.ctrl.need_fp_dest()))
            .collect();
        let is_move: Vec<bool> = lanes
            .iter()
            .zip(&need_int)
            .map(|(u, &int)| move_elimination && int && u.is_some_and(|u| u.ctrl.is_move))
            .collect();
        let int_req = need_int.iter().zip(&is_move).map(|(&n, &m)| n && !m).collect();
        Self {
            need_int,
            need_fp,
            is_move,
            int_req,
        }
    }
}

/// The rename stage.
#[derive(Clone, Debug)]
pub struct Rename {
    config: Config,
    units: Units,
    rob_idx_head: CircularPtr,
    last_cycle_misprediction: bool,
}

impl Rename {
    /// Creates the stage in its reset state: every architectural register
    /// `x_i`/`f_i` maps to `p_i`, all other physical registers are free.
    ///
    /// # Errors
    ///
    /// Returns the first constraint `config` violates.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let regs = &config.registers;
        Ok(Self {
            config: config.clone(),
            units: Units {
                int_freelist: MeFreeList::new(regs.int_phys_regs),
                fp_freelist: StdFreeList::new(RegClass::Fp, regs.fp_phys_regs),
                refcount: RefCounter::new(regs.int_phys_regs),
            },
            rob_idx_head: CircularPtr::new(config.pipeline.rob_size),
            last_cycle_misprediction: false,
        })
    }

    /// Configuration the stage was built with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Integer free list.
    pub const fn int_freelist(&self) -> &MeFreeList {
        &self.units.int_freelist
    }

    /// Floating-point free list.
    pub const fn fp_freelist(&self) -> &StdFreeList {
        &self.units.fp_freelist
    }

    /// Integer reference counter.
    pub const fn refcounter(&self) -> &RefCounter {
        &self.units.refcount
    }

    /// Sequence index the next accepted micro-op would receive, before any
    /// pending post-redirect adjustment.
    pub const fn rob_idx_head(&self) -> CircularPtr {
        self.rob_idx_head
    }

    /// Returns true when the previous cycle redirected without flushing the
    /// redirecting micro-op.
    pub const fn last_cycle_misprediction(&self) -> bool {
        self.last_cycle_misprediction
    }

    /// Advances the stage by one cycle.
    ///
    /// # Arguments
    ///
    /// * `input` - Decode batch, table reads, dispatch readiness, redirect and
    ///   reorder-buffer retirement sampled this cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`RenameError`] when the batch is wider than `rename_width`,
    /// when more than `commit_width` records retire, or when the retirement
    /// stream or the table reads break a bookkeeping invariant. The stage is
    /// unchanged in that case.
    pub fn tick(&mut self, input: &RenameInput) -> Result<RenameOutput, RenameError> {
        let pipeline = &self.config.pipeline;
        if input.uops.len() > pipeline.rename_width {
            return Err(RenameError::BatchTooWide {
                lanes: input.uops.len(),
                width: pipeline.rename_width,
            });
        }
        let commits = &input.commits;
        if commits.infos.len() > pipeline.commit_width {
            return Err(RenameError::TooManyCommits {
                count: commits.infos.len(),
                width: pipeline.commit_width,
            });
        }

        let mut next = self.units.clone();
        let mut out = RenameOutput::default();

        if commits.is_walk {
            next.walk(&commits.infos)?;
            if !commits.infos.is_empty() {
                tracing::debug!(walked = commits.infos.len(), "walk");
            }
        } else {
            let (int_freed, fp_freed) = next.retire(&commits.infos)?;
            out.int_freed = int_freed;
            out.fp_freed = fp_freed;
        }

        let lanes = input.uops.as_slice();
        let valid = lanes.iter().flatten().count();
        let needs = LaneNeeds::new(lanes, self.config.features.move_elimination);
        let int_requested = needs.int_req.iter().filter(|&&r| r).count();
        let fp_requested = needs.need_fp.iter().filter(|&&r| r).count();

        let walking = commits.is_walk;
        let int_ok = next.int_freelist.can_allocate(int_requested);
        let fp_ok = next.fp_freelist.can_allocate(fp_requested);
        let can_out = input.out_ready && int_ok && fp_ok && !walking;
        let fire = valid > 0 && can_out && input.redirect.is_none();

        if valid > 0 && input.redirect.is_none() && !can_out {
            let reason = if walking {
                StallReason::Walk
            } else if !int_ok {
                StallReason::IntFreeList
            } else if !fp_ok {
                StallReason::FpFreeList
            } else {
                StallReason::Dispatch
            };
            tracing::debug!(%reason, valid, int_requested, fp_requested, "rename stall");
            out.stall = Some(reason);
        }

        let base = if self.last_cycle_misprediction {
            self.rob_idx_head + 1
        } else {
            self.rob_idx_head
        };

        if fire {
            let int_alloc = next.int_freelist.allocate(&needs.int_req)?;
            let fp_alloc = next.fp_freelist.allocate(&needs.need_fp)?;
            out.uops = self.rename_batch(input, lanes, &needs, base, &int_alloc, &fp_alloc);

            let mut ref_ports = Vec::with_capacity(out.uops.len());
            for uop in &out.uops {
                let lane = uop.lane;
                if needs.need_int[lane] {
                    ref_ports.push(Some(uop.pdest));
                    out.int_writes.push(RatWrite {
                        class: RegClass::Int,
                        ldest: uop.ctrl.ldest,
                        pdest: uop.pdest,
                    });
                }
                if needs.need_fp[lane] {
                    out.fp_writes.push(RatWrite {
                        class: RegClass::Fp,
                        ldest: uop.ctrl.ldest,
                        pdest: uop.pdest,
                    });
                }
                tracing::trace!(
                    lane,
                    rob_idx = uop.rob_idx.value(),
                    pc = uop.pc,
                    ldest = uop.ctrl.ldest,
                    pdest = %uop.pdest,
                    psrc0 = %uop.psrc[0],
                    psrc1 = %uop.psrc[1],
                    psrc2 = %uop.psrc[2],
                    eliminated_move = uop.eliminated_move,
                    lui_fused = uop.lui_fused,
                    "renamed"
                );
            }
            next.refcount.allocate(&ref_ports)?;
            out.accepted = true;
        }

        self.units = next;
        self.rob_idx_head = match input.redirect {
            Some(redirect) => {
                tracing::debug!(
                    rob_idx = redirect.rob_idx.value(),
                    flush_itself = redirect.flush_itself,
                    discarded = valid,
                    "redirect"
                );
                redirect.rob_idx
            }
            None if fire => base + valid,
            None => base,
        };
        self.last_cycle_misprediction = input.redirect.is_some_and(|r| !r.flush_itself);
        Ok(out)
    }

    /// Builds the renamed micro-ops of an accepted batch in lane order.
    fn rename_batch(
        &self,
        input: &RenameInput,
        lanes: &[Option<DecodedUop>],
        needs: &LaneNeeds,
        base: CircularPtr,
        int_alloc: &[Option<PhysReg>],
        fp_alloc: &[Option<PhysReg>],
    ) -> Vec<RenamedUop> {
        let psrc_width = self.config.int_psrc_width();
        let claims: Vec<WriteClaim> = lanes
            .iter()
            .enumerate()
            .map(|(i, u)| {
                u.map_or_else(WriteClaim::default, |u| {
                    WriteClaim::new(&u.ctrl, needs.need_int[i], needs.need_fp[i])
                })
            })
            .collect();
        let lane_lookups: Vec<[Lookup; NUM_LOOKUPS]> = lanes
            .iter()
            .zip(&claims)
            .map(|(u, &claim)| {
                u.map_or([Lookup::default(); NUM_LOOKUPS], |u| bypass::lookups(&u.ctrl, claim))
            })
            .collect();
        let writers = bypass::bypass_matrix(&claims, &lane_lookups);

        let mut pdests: Vec<PhysReg> = Vec::with_capacity(lanes.len());
        let mut renamed = Vec::with_capacity(lanes.len());
        let mut seq = 0;
        for (i, lane) in lanes.iter().enumerate() {
            let Some(dec) = lane else {
                pdests.push(PhysReg::default());
                continue;
            };
            let int_read = input.int_reads.get(i).copied().unwrap_or_default();
            let fp_read = input.fp_reads.get(i).copied().unwrap_or_default();
            let mut ctrl = dec.ctrl;

            let mut psrc = [PhysReg::default(); NUM_SRCS];
            for (k, p) in psrc.iter_mut().enumerate() {
                *p = if ctrl.src_type[k] == SrcType::Fp {
                    fp_read.psrc[k]
                } else {
                    int_read.psrc[k]
                };
            }
            let mut old_pdest = if needs.need_fp[i] {
                fp_read.old_pdest
            } else {
                int_read.old_pdest
            };

            for (k, writer) in writers[i].iter().enumerate() {
                let Some(j) = *writer else {
                    continue;
                };
                if k < NUM_LOOKUPS - 1 {
                    psrc[k] = pdests[j];
                } else {
                    old_pdest = pdests[j];
                }
            }

            let pdest = if needs.is_move[i] {
                psrc[0]
            } else if needs.need_fp[i] {
                fp_alloc.get(i).copied().flatten().unwrap_or_default()
            } else {
                int_alloc.get(i).copied().flatten().unwrap_or_default()
            };
            pdests.push(pdest);

            let mut lui_fused = false;
            if self.config.features.lui_load_fusion && i > 0 {
                if let Some(prev) = lanes[i - 1] {
                    if fusion::is_lui_load(&prev.ctrl, &ctrl) {
                        let fused = fusion::fuse_lui_load(prev.ctrl.imm_bits(), ctrl.imm, psrc_width);
                        ctrl.src_type[0] = SrcType::Imm;
                        ctrl.imm = fused.imm;
                        psrc[0] = fused.psrc[0];
                        psrc[1] = fused.psrc[1];
                        lui_fused = true;
                    }
                }
            }
            fusion::pack_fence(&mut ctrl);
            fusion::rewrite_soft_prefetch(&mut ctrl);

            renamed.push(RenamedUop {
                lane: i,
                pc: dec.pc,
                ctrl,
                psrc,
                pdest,
                old_pdest,
                rob_idx: base + seq,
                mem_dep: input.hints.get(i).copied().unwrap_or_default(),
                eliminated_move: needs.is_move[i],
                lui_fused,
            });
            seq += 1;
        }
        renamed
    }
}
