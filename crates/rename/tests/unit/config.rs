//! # Configuration Tests
//!
//! Verifies JSON loading with per-field defaults and the validation rules.

use rstest::rstest;
use rvsim_rename::common::{ConfigError, RegClass};
use rvsim_rename::config::Config;
use rvsim_rename::core::Rename;

/// Omitted sections and fields fall back to their defaults.
#[test]
fn partial_json_uses_defaults() {
    let config = Config::from_json(r#"{ "features": { "move_elimination": false } }"#).unwrap();
    assert!(!config.features.move_elimination);
    assert!(config.features.lui_load_fusion);
    assert_eq!(config.pipeline.rename_width, 6);
    assert_eq!(config.pipeline.commit_width, 6);
    assert_eq!(config.pipeline.rob_size, 256);
    assert_eq!(config.registers.int_phys_regs, 192);
}

/// An empty object is the default configuration.
#[test]
fn empty_json_is_default() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.pipeline.rename_width, Config::default().pipeline.rename_width);
    assert_eq!(config.registers.fp_phys_regs, 192);
}

/// Malformed JSON is reported as such.
#[test]
fn malformed_json_rejected() {
    assert!(matches!(
        Config::from_json(r#"{ "pipeline": { "rename_width": "four" } }"#),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(Config::from_json("{"), Err(ConfigError::Json(_))));
}

/// Loading validates.
#[test]
fn json_is_validated() {
    let err = Config::from_json(r#"{ "pipeline": { "rename_width": 8, "rob_size": 4 } }"#).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::RobTooSmall {
            rob_size: 4,
            width: 8
        }
    ));
}

/// Zero widths are rejected by name.
#[test]
fn zero_commit_width_rejected() {
    let mut config = Config::default();
    config.pipeline.commit_width = 0;
    let err = config.validate().unwrap_err();
    assert_eq!(err.to_string(), "pipeline.commit_width must be non-zero");
}

/// Each pool must back the architectural registers plus one full batch.
#[rstest]
#[case(RegClass::Int, 37, false)]
#[case(RegClass::Int, 38, true)]
#[case(RegClass::Fp, 37, false)]
#[case(RegClass::Fp, 38, true)]
fn pool_lower_bound(#[case] class: RegClass, #[case] regs: usize, #[case] ok: bool) {
    let mut config = Config::default();
    match class {
        RegClass::Int => config.registers.int_phys_regs = regs,
        RegClass::Fp => config.registers.fp_phys_regs = regs,
    }
    assert_eq!(config.validate().is_ok(), ok);
    assert_eq!(Rename::new(&config).is_ok(), ok);
}

/// Pools beyond the 16-bit id space are rejected.
#[test]
fn pool_upper_bound() {
    let mut config = Config::default();
    config.registers.int_phys_regs = 70_000;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::TooManyPhysRegs {
            class: RegClass::Int,
            regs: 70_000
        })
    ));
}

/// The fused-immediate split follows the integer id width.
#[rstest]
#[case(38, 6)]
#[case(64, 6)]
#[case(65, 7)]
#[case(128, 7)]
#[case(192, 8)]
#[case(512, 9)]
fn id_width_follows_int_pool(#[case] regs: usize, #[case] width: u32) {
    let mut config = Config::default();
    config.registers.int_phys_regs = regs;
    assert_eq!(config.int_psrc_width(), width);
}
