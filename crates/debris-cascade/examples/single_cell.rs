//! Evolve one annulus of a solar-type debris disk at 1 AU.
//!
//! Run with `cargo run --example single_cell -p debris-cascade`.

use debris_cascade::lookup::{RadiationInputs, SOLAR_LUMINOSITY_W};
use debris_cascade::{
    CascadeConfig, CellStepper, NumericKernels, PsdState, StepInputs, SupplyMode,
};
use units::{
    circular_orbital_velocity, AngularVelocity, Length, SurfaceDensity, SurfaceDensityRate, Time,
    Velocity,
};

const SOLAR_MASS_KG: f64 = 1.988_47e30;
const MAX_STEPS: usize = 500;

fn main() -> debris_cascade::Result<()> {
    let mut config = CascadeConfig::default();
    config.supply = SupplyMode::PowerLaw {
        s_inj_min: 1e-3,
        s_inj_max: 1.0,
        q: 3.5,
    };

    let grid = config.grid.build()?;
    let rho = config.grid.rho;
    let mut psd = PsdState::power_law(grid, rho, 3.5, SurfaceDensity::from_kg_per_m2(1e-4))?;
    let stepper = CellStepper::new(config)?;

    let sun = RadiationInputs {
        luminosity: SOLAR_LUMINOSITY_W,
        central_mass: SOLAR_MASS_KG,
        temperature: 5772.0,
    };
    let a_blow = stepper.lookup().blowout_radius(rho.to_kg_per_m3(), &sun)?;

    let r = Length::from_au(1.0);
    let mut inputs = StepInputs {
        dt: Time::from_days(1.0),
        omega: AngularVelocity::keplerian(SOLAR_MASS_KG, r),
        v_k: circular_orbital_velocity(SOLAR_MASS_KG, r),
        r,
        tau_eff: 1e-4,
        a_blow: Length::from_meters(a_blow),
        ds_dt: Velocity::zero(),
        production: SurfaceDensityRate::from_kg_per_m2_per_sec(1e-14),
        area_m2: r.annulus_area(Length::from_au(1.1)),
    };

    println!("blow-out size: {:.2} μm", a_blow * 1e6);
    println!("backend: {}", stepper.kernels().name());
    println!("{:>10} {:>14} {:>14} {:>10}", "t [yr]", "Σ [kg/m²]", "Ṁ_blow [kg/s]", "budget");

    let mut elapsed = Time::zero();
    for _ in 0..MAX_STEPS {
        let result = stepper.step(&mut psd, &inputs)?;
        elapsed = elapsed + inputs.dt;

        println!(
            "{:>10.4} {:>14.6e} {:>14.6e} {:>10.2e}",
            elapsed.to_years(),
            result.surface_density.to_kg_per_m2(),
            result.mass_loss_rate_blowout.to_kg_per_sec(),
            result.diagnostics.mass_budget.relative_error,
        );

        if elapsed.to_years() >= 10.0 {
            break;
        }
        inputs.dt = result.diagnostics.advice.dt_suggested;
    }

    Ok(())
}
