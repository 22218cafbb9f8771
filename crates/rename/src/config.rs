//! Configuration system for the rename model.
//!
//! This module defines the configuration structures used to parameterize
//! the rename stage. It provides:
//! 1. **Defaults:** Baseline widths and pool sizes of a six-wide out-of-order core.
//! 2. **Structures:** Hierarchical config for pipeline widths, register pools, and features.
//! 3. **Validation:** Rejection of parameter combinations the model cannot represent.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with `Config::default()`.

use serde::Deserialize;

use crate::common::constants::{ARCH_REGS, LUI_IMM_IN_PSRC};
use crate::common::error::ConfigError;
use crate::common::reg::{RegClass, phys_reg_id_width};

/// Default configuration constants for the rename model.
mod defaults {
    /// Default rename width (micro-ops renamed per cycle).
    pub const RENAME_WIDTH: usize = 6;

    /// Default commit width (reorder-buffer entries retired or walked per cycle).
    pub const COMMIT_WIDTH: usize = 6;

    /// Default reorder buffer size (entries).
    pub const ROB_SIZE: usize = 256;

    /// Default integer physical register pool size.
    pub const INT_PHYS_REGS: usize = 192;

    /// Default floating-point physical register pool size.
    pub const FP_PHYS_REGS: usize = 192;
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use rvsim_rename::config::Config;
///
/// let json = r#"{ "pipeline": { "rename_width": 4 }, "registers": { "int_phys_regs": 128 } }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.pipeline.rename_width, 4);
/// assert_eq!(config.registers.int_phys_regs, 128);
/// assert_eq!(config.registers.fp_phys_regs, 192);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Pipeline widths and reorder buffer size.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Physical register pool sizes.
    #[serde(default)]
    pub registers: RegisterConfig,
    /// Optional rename-time optimizations.
    #[serde(default)]
    pub features: FeatureConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and any validation error
    /// reported by [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the parameters describe a representable rename stage.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline;
        if p.rename_width == 0 {
            return Err(ConfigError::Zero("pipeline.rename_width"));
        }
        if p.commit_width == 0 {
            return Err(ConfigError::Zero("pipeline.commit_width"));
        }
        if p.rob_size < p.rename_width {
            return Err(ConfigError::RobTooSmall {
                rob_size: p.rob_size,
                width: p.rename_width,
            });
        }

        let r = &self.registers;
        for (class, regs) in [(RegClass::Int, r.int_phys_regs), (RegClass::Fp, r.fp_phys_regs)] {
            let needed = ARCH_REGS + p.rename_width;
            if regs < needed {
                return Err(ConfigError::TooFewPhysRegs {
                    class,
                    regs,
                    needed,
                });
            }
            if regs > usize::from(u16::MAX) + 1 {
                return Err(ConfigError::TooManyPhysRegs { class, regs });
            }
        }

        // A pool of at least ARCH_REGS + 1 registers has ids of six bits or more,
        // enough for two source slots to carry the spilled upper immediate.
        debug_assert!(2 * phys_reg_id_width(r.int_phys_regs) >= LUI_IMM_IN_PSRC);
        Ok(())
    }

    /// Bit width of an integer physical register id.
    pub const fn int_psrc_width(&self) -> u32 {
        phys_reg_id_width(self.registers.int_phys_regs)
    }
}

/// Pipeline widths.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Micro-ops renamed per cycle
    #[serde(default = "PipelineConfig::default_rename_width")]
    pub rename_width: usize,

    /// Reorder-buffer entries committed or walked per cycle
    #[serde(default = "PipelineConfig::default_commit_width")]
    pub commit_width: usize,

    /// Reorder buffer entries (capacity of the sequence index ring)
    #[serde(default = "PipelineConfig::default_rob_size")]
    pub rob_size: usize,
}

impl PipelineConfig {
    /// Returns the default rename width.
    fn default_rename_width() -> usize {
        defaults::RENAME_WIDTH
    }

    /// Returns the default commit width.
    fn default_commit_width() -> usize {
        defaults::COMMIT_WIDTH
    }

    /// Returns the default reorder buffer size.
    fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rename_width: defaults::RENAME_WIDTH,
            commit_width: defaults::COMMIT_WIDTH,
            rob_size: defaults::ROB_SIZE,
        }
    }
}

/// Physical register pool sizes.
///
/// Each class additionally has [`ARCH_REGS`] architectural registers, which
/// occupy the first physical ids at reset.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterConfig {
    /// Integer physical registers
    #[serde(default = "RegisterConfig::default_int_phys_regs")]
    pub int_phys_regs: usize,

    /// Floating-point physical registers
    #[serde(default = "RegisterConfig::default_fp_phys_regs")]
    pub fp_phys_regs: usize,
}

impl RegisterConfig {
    /// Returns the default integer pool size.
    fn default_int_phys_regs() -> usize {
        defaults::INT_PHYS_REGS
    }

    /// Returns the default floating-point pool size.
    fn default_fp_phys_regs() -> usize {
        defaults::FP_PHYS_REGS
    }
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            int_phys_regs: defaults::INT_PHYS_REGS,
            fp_phys_regs: defaults::FP_PHYS_REGS,
        }
    }
}

/// Rename-time optimizations.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
    /// Eliminate integer register moves by sharing the source's physical register
    #[serde(default = "FeatureConfig::enabled")]
    pub move_elimination: bool,

    /// Fold an upper-immediate load into a directly following dependent load
    #[serde(default = "FeatureConfig::enabled")]
    pub lui_load_fusion: bool,
}

impl FeatureConfig {
    /// Features default to on.
    const fn enabled() -> bool {
        true
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            move_elimination: true,
            lui_load_fusion: true,
        }
    }
}
