//! Tests for the blow-out sink.

use approx::assert_relative_eq;

use crate::sinks::{blowout_ratio, BlowoutConfig, BlowoutMode, BlowoutSink, RatioFlags};

const OMEGA: f64 = 1e-4;

fn sink(mode: BlowoutMode) -> BlowoutSink {
    BlowoutSink::new(BlowoutConfig {
        enabled: true,
        chi_blow: 1.0,
        mode,
    })
}

fn sizes() -> Vec<f64> {
    vec![1e-7, 1e-6, 1e-5, 1e-4]
}

fn masses() -> Vec<f64> {
    vec![1.0, 2.0, 3.0, 4.0]
}

// =============================================================================
// Planning
// =============================================================================

#[test]
fn ratio_is_dt_over_t_blow() {
    assert_relative_eq!(blowout_ratio(2e4, OMEGA, 1.0).unwrap(), 2.0);
    assert_relative_eq!(blowout_ratio(2e4, OMEGA, 2.0).unwrap(), 1.0);
    assert!(blowout_ratio(1.0, f64::NAN, 1.0).is_err());
    assert!(blowout_ratio(1.0, 0.0, 1.0).is_err());
}

#[test]
fn flags_follow_thresholds() {
    assert_eq!(RatioFlags::from_ratio(0.5), RatioFlags::default());
    let f = RatioFlags::from_ratio(4.0);
    assert!(f.above_unity && f.above_3 && !f.above_10);
    assert!(RatioFlags::from_ratio(11.0).above_10);
}

#[test]
fn substep_count_keeps_ratio_below_ceiling() {
    let plan = sink(BlowoutMode::Substep { ratio_max: 0.5 })
        .plan(3.2e4, OMEGA)
        .unwrap();

    assert_eq!(plan.substeps, 7);
    assert!(plan.substep_ratio() <= 0.5);
    assert!(plan.flags.above_3);
}

#[test]
fn other_modes_use_one_step() {
    for mode in [BlowoutMode::None, BlowoutMode::Correction] {
        assert_eq!(sink(mode).plan(1e6, OMEGA).unwrap().substeps, 1);
    }
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn small_ratio_removes_explicit_fraction() {
    let mut number = vec![10.0; 4];
    let t_blow = 1.0 / OMEGA;
    let h = 0.25 * t_blow;

    let removal = sink(BlowoutMode::Correction).apply(&mut number, &sizes(), &masses(), 2e-6, h, t_blow);

    // Bins 0 and 1 are below a_blow
    assert_relative_eq!(number[0], 7.5);
    assert_relative_eq!(number[1], 7.5);
    assert_eq!(&number[2..], &[10.0, 10.0]);
    assert_relative_eq!(removal.mass, 2.5 * 1.0 + 2.5 * 2.0);
    assert!(!removal.correction_applied);
    assert_eq!(removal.chi_eff, 1.0);
}

#[test]
fn correction_never_removes_more_than_present() {
    let t_blow = 1.0 / OMEGA;
    for ratio in [0.01, 0.5, 1.0, 1.5, 3.0, 10.0, 100.0, 1e4] {
        let mut number = vec![10.0; 4];
        let removal =
            sink(BlowoutMode::Correction).apply(&mut number, &sizes(), &masses(), 2e-6, ratio * t_blow, t_blow);

        assert!(removal.mass >= 0.0);
        assert!(removal.mass <= 10.0 * (1.0 + 2.0));
        assert!(number.iter().all(|&n| n >= 0.0));
    }
}

#[test]
fn correction_matches_exponential_decay() {
    let mut number = vec![10.0; 4];
    let t_blow = 1.0 / OMEGA;

    let removal = sink(BlowoutMode::Correction).apply(&mut number, &sizes(), &masses(), 2e-6, 3.0 * t_blow, t_blow);

    assert!(removal.correction_applied);
    assert_relative_eq!(number[0], 10.0 * (-3.0f64).exp(), max_relative = 1e-12);
    assert_relative_eq!(removal.chi_eff, (1.0 - (-3.0f64).exp()) / 3.0, max_relative = 1e-12);
}

#[test]
fn uncorrected_mode_overshoots() {
    let mut number = vec![10.0; 4];
    let t_blow = 1.0 / OMEGA;

    let removal = sink(BlowoutMode::None).apply(&mut number, &sizes(), &masses(), 2e-6, 2.0 * t_blow, t_blow);

    assert!(!removal.correction_applied);
    assert!(number[0] < 0.0);
    assert_relative_eq!(removal.mass, 20.0 * 1.0 + 20.0 * 2.0);
}

#[test]
fn disabled_sink_does_nothing() {
    let disabled = BlowoutSink::new(BlowoutConfig {
        enabled: false,
        ..Default::default()
    });
    let mut number = vec![10.0; 4];

    let removal = disabled.apply(&mut number, &sizes(), &masses(), 1.0, 1e9, 1.0);

    assert_eq!(removal.mass, 0.0);
    assert_eq!(number, vec![10.0; 4]);
}

#[test]
fn config_validation() {
    assert!(BlowoutConfig::default().validate().is_ok());
    let bad = BlowoutConfig {
        mode: BlowoutMode::Substep { ratio_max: 0.0 },
        ..Default::default()
    };
    assert!(bad.validate().is_err());
    let bad = BlowoutConfig {
        chi_blow: -1.0,
        ..Default::default()
    };
    assert!(bad.validate().is_err());
}
