//! Tests for the collision kernel.

use std::f64::consts::PI;

use approx::assert_relative_eq;

use crate::collisions::{collision_kernel, pair_velocities, DynamicsProfile};
use crate::grid::grain_mass;

fn uniform_profile(n: usize, e: f64, i: f64, h: f64) -> DynamicsProfile {
    DynamicsProfile {
        e: vec![e; n],
        i: vec![i; n],
        h: vec![h; n],
    }
}

#[test]
fn uniform_dispersion_gives_classic_velocity() {
    let profile = uniform_profile(3, 0.02, 0.01, 1e4);
    let v = pair_velocities(&profile, 3_000.0).unwrap();

    let expected = 3_000.0 * (1.25 * 0.02f64.powi(2) + 0.01f64.powi(2)).sqrt();
    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(v.get(i, j), expected, max_relative = 1e-14);
        }
    }
}

#[test]
fn kernel_matches_geometric_formula() {
    let sizes = [1e-5, 1e-3];
    let masses: Vec<f64> = sizes.iter().map(|&s| grain_mass(s, 3000.0)).collect();
    let profile = uniform_profile(2, 0.02, 0.01, 1e4);
    let v = pair_velocities(&profile, 3_000.0).unwrap();

    let k = collision_kernel(&sizes, &masses, &profile, &v, false).unwrap();

    let h_pair = (2.0f64).sqrt() * 1e4;
    let expected = PI * (sizes[0] + sizes[1]).powi(2) * v.get(0, 1) / ((2.0 * PI).sqrt() * h_pair);
    assert_relative_eq!(k.get(0, 1), expected, max_relative = 1e-14);
    assert!(k.is_symmetric(0.0));
}

#[test]
fn kernel_grows_with_size() {
    let sizes = [1e-6, 1e-4, 1e-2];
    let masses: Vec<f64> = sizes.iter().map(|&s| grain_mass(s, 3000.0)).collect();
    let profile = uniform_profile(3, 0.02, 0.01, 1e4);
    let v = pair_velocities(&profile, 3_000.0).unwrap();

    let k = collision_kernel(&sizes, &masses, &profile, &v, false).unwrap();

    assert!(k.get(2, 2) > k.get(1, 1));
    assert!(k.get(1, 1) > k.get(0, 0));
}

#[test]
fn focusing_only_enhances() {
    // Large slow bodies: focusing matters
    let sizes = [1e3, 1e4];
    let masses: Vec<f64> = sizes.iter().map(|&s| grain_mass(s, 3000.0)).collect();
    let profile = uniform_profile(2, 1e-4, 5e-5, 1e4);
    let v = pair_velocities(&profile, 3_000.0).unwrap();

    let bare = collision_kernel(&sizes, &masses, &profile, &v, false).unwrap();
    let focused = collision_kernel(&sizes, &masses, &profile, &v, true).unwrap();

    for i in 0..2 {
        for j in 0..2 {
            assert!(focused.get(i, j) > bare.get(i, j));
        }
    }
}

#[test]
fn rejects_mismatched_inputs() {
    let profile = uniform_profile(2, 0.02, 0.01, 1e4);
    let v = pair_velocities(&profile, 3_000.0).unwrap();

    assert!(collision_kernel(&[1e-5, 1e-4, 1e-3], &[1.0, 1.0, 1.0], &profile, &v, false).is_err());
    assert!(pair_velocities(&profile, f64::NAN).is_err());

    let flat = uniform_profile(2, 0.02, 0.01, 0.0);
    assert!(collision_kernel(&[1e-5, 1e-4], &[1.0, 1.0], &flat, &v, false).is_err());
}
