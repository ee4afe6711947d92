//! Tests for configuration defaults, validation and serialization.

use crate::backend::BackendPreference;
use crate::collisions::{DynamicsModel, RemnantLaw};
use crate::config::{CascadeConfig, GridConfig};
use crate::error::CascadeError;
use crate::sinks::BlowoutMode;
use crate::supply::SupplyMode;

#[test]
fn defaults_are_valid() {
    let config = CascadeConfig::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.grid.n_bins, 40);
    assert_eq!(config.blowout.mode, BlowoutMode::Correction);
    assert_eq!(config.backend, BackendPreference::Auto);
    assert_eq!(config.budget.tolerance, 5e-3);
    assert_eq!(config.timestep.safety_factor, 0.1);
}

#[test]
fn json_round_trip() {
    let config = CascadeConfig {
        dynamics: crate::collisions::DynamicsConfig {
            model: DynamicsModel::DiskThickness { h_over_r: 0.01 },
            ..Default::default()
        },
        blowout: crate::sinks::BlowoutConfig {
            mode: BlowoutMode::Substep { ratio_max: 0.5 },
            ..Default::default()
        },
        supply: SupplyMode::PowerLaw {
            s_inj_min: 1e-5,
            s_inj_max: 1e-2,
            q: 3.5,
        },
        ..Default::default()
    };

    let json = serde_json::to_string_pretty(&config).unwrap();
    let back: CascadeConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(back, config);
}

#[test]
fn partial_json_fills_defaults() {
    let json = r#"{
        "grid": { "n_bins": 12 },
        "fragmentation": { "alpha": 1.0, "remnant": { "Constant": 0.2 } },
        "backend": "Reference"
    }"#;

    let config: CascadeConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.grid.n_bins, 12);
    assert_eq!(config.grid.s_min, GridConfig::default().s_min);
    assert_eq!(config.fragmentation.remnant, RemnantLaw::Constant(0.2));
    assert_eq!(config.backend, BackendPreference::Reference);
    assert_eq!(config.collision_depletion_cap, 0.5);
    assert!(config.validate().is_ok());
}

#[test]
fn validation_catches_bad_sections() {
    let mut config = CascadeConfig::default();
    config.grid.n_bins = 0;
    assert!(matches!(config.validate(), Err(CascadeError::InvalidGrid(_))));

    let mut config = CascadeConfig::default();
    config.collision_depletion_cap = 1.5;
    assert!(matches!(config.validate(), Err(CascadeError::InvalidConfig(_))));

    let mut config = CascadeConfig::default();
    config.fragmentation.remnant = RemnantLaw::Constant(2.0);
    assert!(config.validate().is_err());

    let mut config = CascadeConfig::default();
    config.budget.tolerance = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn supply_window_must_touch_grid() {
    let mut config = CascadeConfig::default();
    config.supply = SupplyMode::PowerLaw {
        s_inj_min: 10.0,
        s_inj_max: 20.0,
        q: 3.5,
    };

    assert!(matches!(
        config.validate(),
        Err(CascadeError::EmptySupplyWindow { .. })
    ));
}
