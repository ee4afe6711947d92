//! Criterion benchmarks for the gain/loss kernels.
//!
//! Two benchmark groups:
//! - `kernels`: collision rates, loss and gain on both backends
//! - `cell_step`: one full step of a 60-bin cell

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use debris_cascade::backend::{AcceleratedKernels, ReferenceKernels};
use debris_cascade::collisions::{FragmentTensor, PairMatrix, PairOutcome, PairOutcomes};
use debris_cascade::grid::grain_mass;
use debris_cascade::{
    BackendPreference, CascadeConfig, CellStepper, NumericKernels, PsdState, SizeGrid, StepInputs,
};
use units::{
    circular_orbital_velocity, AngularVelocity, Length, SurfaceDensity, SurfaceDensityRate, Time,
    Velocity, MARS_MASS_KG,
};

// ===========================================================================
// Problem builders
// ===========================================================================

struct Problem {
    mass: Vec<f64>,
    rates: PairMatrix,
    tensor: FragmentTensor,
}

fn build_problem(n: usize) -> Problem {
    let grid = SizeGrid::geometric(1e-6, 1.0, n).unwrap();
    let mass: Vec<f64> = grid.sizes().iter().map(|&s| grain_mass(s, 3000.0)).collect();
    let number: Vec<f64> = grid.sizes().iter().map(|&s| 1e-6 * s.powf(-2.5)).collect();
    let kernel = PairMatrix::from_upper(n, |i, j| {
        let s = grid.sizes()[i] + grid.sizes()[j];
        1e-7 * s * s
    });

    let mut outcomes = PairOutcomes::new(n);
    for i in 0..n {
        for j in i..n {
            let outcome = PairOutcome {
                valid: true,
                f_lr: 0.2,
                k_lr: j.saturating_sub(1),
            };
            outcomes.set_symmetric(i, j, outcome);
        }
    }

    let rates = ReferenceKernels.collision_rates(&kernel, &number);
    let tensor = ReferenceKernels.fragment_tensor(grid.edges(), &outcomes, 0.5);
    Problem { mass, rates, tensor }
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernels");
    for n in [20, 40, 80] {
        let problem = build_problem(n);
        let backends: [&dyn NumericKernels; 2] = [&ReferenceKernels, &AcceleratedKernels];

        for kernels in backends {
            group.bench_with_input(BenchmarkId::new(format!("loss/{}", kernels.name()), n), &n, |b, _| {
                b.iter(|| kernels.loss(black_box(&problem.rates)))
            });
            group.bench_with_input(BenchmarkId::new(format!("gain/{}", kernels.name()), n), &n, |b, _| {
                b.iter(|| {
                    kernels.gain(
                        black_box(&problem.rates),
                        black_box(&problem.tensor),
                        black_box(&problem.mass),
                    )
                })
            });
        }
    }
    group.finish();
}

fn bench_cell_step(c: &mut Criterion) {
    let mut config = CascadeConfig::default();
    config.grid.n_bins = 60;
    config.backend = BackendPreference::Accelerated;
    let grid = config.grid.build().unwrap();
    let initial = PsdState::power_law(grid, config.grid.rho, 3.5, SurfaceDensity::from_kg_per_m2(1.0)).unwrap();
    let stepper = CellStepper::new(config).unwrap();

    let r = Length::from_mars_radii(2.5);
    let inputs = StepInputs {
        dt: Time::from_days(1.0),
        omega: AngularVelocity::keplerian(MARS_MASS_KG, r),
        v_k: circular_orbital_velocity(MARS_MASS_KG, r),
        r,
        tau_eff: 1e-3,
        a_blow: Length::from_microns(1.0),
        ds_dt: Velocity::zero(),
        production: SurfaceDensityRate::zero(),
        area_m2: 1e14,
    };

    c.bench_function("cell_step/60", |b| {
        b.iter(|| {
            let mut state = initial.clone();
            stepper.step(&mut state, black_box(&inputs)).unwrap()
        })
    });
}

criterion_group!(benches, bench_kernels, bench_cell_step);
criterion_main!(benches);
