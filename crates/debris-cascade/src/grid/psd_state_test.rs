//! Tests for the per-cell size distribution.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use units::{Density, SurfaceDensity};

use crate::error::CascadeError;
use crate::grid::{grain_mass, PsdState, SizeGrid};

fn basalt() -> Density {
    Density::from_kg_per_m3(3000.0)
}

fn grid() -> SizeGrid {
    SizeGrid::geometric(1e-6, 1.0, 30).unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn grain_mass_of_sphere() {
    assert_relative_eq!(grain_mass(1.0, 3000.0), 4000.0 * PI, max_relative = 1e-14);
    assert_relative_eq!(grain_mass(2.0, 1.0), 8.0 * grain_mass(1.0, 1.0));
}

#[test]
fn empty_state_has_zero_mass() {
    let psd = PsdState::empty(grid(), basalt()).unwrap();

    assert_eq!(psd.n_bins(), 30);
    assert_eq!(psd.surface_density().to_kg_per_m2(), 0.0);
    assert!(psd.is_sanitized());
}

#[test]
fn masses_follow_bin_centres() {
    let psd = PsdState::empty(grid(), basalt()).unwrap();

    for (s, m) in psd.sizes().iter().zip(psd.mass()) {
        assert_relative_eq!(*m, grain_mass(*s, 3000.0));
    }
}

#[test]
fn power_law_hits_target_surface_density() {
    let sigma = SurfaceDensity::from_kg_per_m2(2.5e-4);
    let psd = PsdState::power_law(grid(), basalt(), 3.5, sigma).unwrap();

    assert_relative_eq!(psd.surface_density().to_kg_per_m2(), 2.5e-4, max_relative = 1e-12);
}

#[test]
fn power_law_number_decreases_with_size() {
    let psd = PsdState::power_law(grid(), basalt(), 3.5, SurfaceDensity::from_kg_per_m2(1.0)).unwrap();

    for n in psd.number().windows(2) {
        assert!(n[1] < n[0]);
    }
}

#[test]
fn dohnanyi_slope_puts_mass_at_large_sizes() {
    let psd = PsdState::power_law(grid(), basalt(), 3.5, SurfaceDensity::from_kg_per_m2(1.0)).unwrap();
    let mass = psd.mass_per_bin();

    // For q < 4, mass per log bin grows with size
    assert!(mass[29] > mass[0]);
}

#[test]
fn from_number_rejects_bad_input() {
    assert!(matches!(
        PsdState::from_number(grid(), basalt(), vec![1.0; 5]),
        Err(CascadeError::ShapeMismatch { expected: 30, found: 5, .. })
    ));

    let mut number = vec![1.0; 30];
    number[3] = -1.0;
    assert!(PsdState::from_number(grid(), basalt(), number).is_err());

    let mut number = vec![1.0; 30];
    number[7] = f64::NAN;
    assert!(matches!(
        PsdState::from_number(grid(), basalt(), number),
        Err(CascadeError::NonFinite { .. })
    ));

    assert!(PsdState::empty(grid(), Density::from_kg_per_m3(0.0)).is_err());
}

// =============================================================================
// Sanitize
// =============================================================================

#[test]
fn sanitize_clamps_bad_entries() {
    let mut psd = PsdState::from_number(grid(), basalt(), vec![1.0; 30]).unwrap();
    {
        let n = psd.number_mut();
        n[0] = -3.0;
        n[1] = f64::NAN;
        n[2] = f64::INFINITY;
        n[3] = f64::NEG_INFINITY;
    }

    let changed = psd.sanitize();

    assert_eq!(changed, 4);
    assert!(psd.is_sanitized());
    assert_eq!(&psd.number()[..4], &[0.0, 0.0, 0.0, 0.0]);
    assert_eq!(psd.number()[4], 1.0);
}

#[test]
fn sanitize_is_idempotent() {
    let mut psd = PsdState::power_law(grid(), basalt(), 3.5, SurfaceDensity::from_kg_per_m2(1.0)).unwrap();
    psd.number_mut()[5] = -1e-20;
    psd.number_mut()[9] = f64::NAN;

    psd.sanitize();
    let once = psd.clone();
    let changed = psd.sanitize();

    assert_eq!(changed, 0);
    assert_eq!(psd, once);
}

#[test]
fn set_number_checks_length_and_sanitizes() {
    let mut psd = PsdState::empty(grid(), basalt()).unwrap();
    assert!(psd.set_number(&[1.0; 3]).is_err());

    let mut values = vec![2.0; 30];
    values[0] = -5.0;
    psd.set_number(&values).unwrap();

    assert_eq!(psd.number()[0], 0.0);
    assert_eq!(psd.number()[1], 2.0);
}
