//! Driver: owns the rename stage together with the structures around it.
//!
//! The stage itself only sees per-cycle records. The driver closes the loop
//! by reading the rename tables for each batch, applying the stage's table
//! writes, and feeding commit, redirect and walk back from its reorder buffer.

use crate::common::error::{ConfigError, RenameError};
use crate::common::reg::{PhysReg, RegClass};
use crate::config::Config;
use crate::core::pipeline::latches::{
    DecodedUop, MemDepHint, RatReadResult, Redirect, RenameInput, RenameOutput, RobCommits,
};
use crate::core::pipeline::rat::RenameTable;
use crate::core::pipeline::rename::Rename;
use crate::core::pipeline::rob::Rob;
use crate::core::units::freelist::FreeList;
use crate::stats::RenameStats;

/// Top-level driver: rename stage + rename tables + reorder buffer.
#[derive(Clone, Debug)]
pub struct RenameDriver {
    /// The rename stage.
    pub rename: Rename,
    /// Integer rename table.
    pub int_rat: RenameTable,
    /// Floating-point rename table.
    pub fp_rat: RenameTable,
    /// Reorder buffer.
    pub rob: Rob,
    /// Performance counters.
    pub stats: RenameStats,
    commit_width: usize,
}

impl RenameDriver {
    /// Creates a driver in its reset state.
    ///
    /// # Errors
    ///
    /// Returns the first constraint `config` violates.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            rename: Rename::new(config)?,
            int_rat: RenameTable::new(RegClass::Int),
            fp_rat: RenameTable::new(RegClass::Fp),
            rob: Rob::new(config.pipeline.rob_size),
            stats: RenameStats::default(),
            commit_width: config.pipeline.commit_width,
        })
    }

    /// Advances the whole loop by one cycle.
    ///
    /// # Arguments
    ///
    /// * `batch` - Decode lanes for this cycle.
    /// * `hints` - Memory-dependence hints per lane.
    /// * `retire_budget` - Oldest entries allowed to commit this cycle (capped at the commit width).
    /// * `redirect` - Misprediction signalled this cycle. Ignored when it falls
    ///   inside a region that is already being walked.
    ///
    /// # Errors
    ///
    /// [`RenameError::BatchTooWide`] when `batch` has more lanes than the
    /// rename width; nothing changes in that case. Otherwise propagates any
    /// [`RenameError`] raised by the stage or the reorder buffer, after which
    /// the driver is left mid-cycle and should be discarded.
    pub fn tick(
        &mut self,
        batch: &[Option<DecodedUop>],
        hints: &[MemDepHint],
        retire_budget: usize,
        redirect: Option<Redirect>,
    ) -> Result<RenameOutput, RenameError> {
        let width = self.rename.config().pipeline.rename_width;
        if batch.len() > width {
            return Err(RenameError::BatchTooWide {
                lanes: batch.len(),
                width,
            });
        }
        // A redirect for a micro-op that a pending walk already squashes is stale.
        let redirect = redirect.filter(|r| {
            let stale = self.rob.is_superseded(r);
            if stale {
                tracing::debug!(rob_idx = r.rob_idx.value(), "stale redirect dropped");
            }
            !stale
        });

        let commits = if self.rob.is_walking() {
            RobCommits::walk(self.rob.walk(self.commit_width))
        } else {
            RobCommits::commit(self.rob.commit(retire_budget.min(self.commit_width)))
        };

        let valid = batch.iter().flatten().count();
        let read = |rat: &RenameTable, lane: &Option<DecodedUop>| {
            lane.map_or_else(RatReadResult::default, |u| rat.read(u.ctrl.lsrc, u.ctrl.ldest))
        };
        let input = RenameInput {
            uops: batch.to_vec(),
            hints: hints.to_vec(),
            int_reads: batch.iter().map(|l| read(&self.int_rat, l)).collect(),
            fp_reads: batch.iter().map(|l| read(&self.fp_rat, l)).collect(),
            out_ready: self.rob.free_slots() >= valid,
            redirect,
            commits,
        };

        let out = self.rename.tick(&input)?;

        for info in &input.commits.infos {
            if input.commits.is_walk {
                self.int_rat.walk(info);
                self.fp_rat.walk(info);
            } else {
                self.int_rat.commit(info);
                self.fp_rat.commit(info);
            }
        }
        self.int_rat.write(&out.int_writes);
        self.fp_rat.write(&out.fp_writes);

        if let Some(redirect) = redirect {
            self.rob.redirect(&redirect)?;
        } else if out.accepted {
            self.rob.enqueue(&out.uops)?;
        }

        self.stats.record(&input, &out);
        Ok(out)
    }

    /// Runs idle cycles that retire everything until the reorder buffer is
    /// empty, returning the number of cycles taken.
    ///
    /// # Errors
    ///
    /// See [`RenameDriver::tick`].
    pub fn drain(&mut self) -> Result<usize, RenameError> {
        let mut cycles = 0;
        while !self.rob.is_empty() || self.rob.is_walking() {
            let _ = self.tick(&[], &[], usize::MAX, None)?;
            cycles += 1;
        }
        Ok(cycles)
    }

    /// Free integer registers in allocation order.
    pub fn int_free_regs(&self) -> Vec<PhysReg> {
        self.rename.int_freelist().free_regs()
    }

    /// Free floating-point registers in allocation order.
    pub fn fp_free_regs(&self) -> Vec<PhysReg> {
        self.rename.fp_freelist().free_regs()
    }

    /// Integer reference counts indexed by physical register.
    pub fn ref_counts(&self) -> Vec<u16> {
        self.rename.refcounter().counts().to_vec()
    }
}
