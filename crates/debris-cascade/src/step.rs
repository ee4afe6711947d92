//! Single-cell step orchestration.
//!
//! A step runs, in order:
//!
//! 1. input validation and the dynamics profile (e, i, H) of the cell
//! 2. pair velocities, the collision kernel and the fragment tensor
//! 3. the supply source
//! 4. one or more sub-steps of collisions, supply and blow-out
//! 5. sublimation drift
//! 6. sanitize and the mass-budget audit
//!
//! The PSD is updated in place. The stepper itself is immutable during a
//! step, so one stepper can serve many cells from many threads as long as
//! each cell owns its [`PsdState`].

use std::sync::Arc;

use units::{
    AngularVelocity, Length, MassRate, SurfaceDensity, SurfaceDensityRate, Time, Velocity,
};

use crate::backend::{KernelDispatch, NumericKernels};
use crate::budget::MassBudgetReport;
use crate::collisions::{
    collision_kernel, limit_pair_rates, min_collision_time, pair_velocities, DynamicalInputs,
};
use crate::config::CascadeConfig;
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, Result};
use crate::grid::PsdState;
use crate::lookup::LookupService;
use crate::sinks::{BlowoutSink, RatioFlags, SublimationDrift};
use crate::supply::{SupplyMode, SupplySource};
use crate::timestep::TimestepAdvice;

/// Per-cell, per-step physical inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInputs {
    pub dt: Time,
    /// Keplerian angular frequency of the cell
    pub omega: AngularVelocity,
    pub v_k: Velocity,
    pub r: Length,
    pub tau_eff: f64,
    /// Blow-out grain size
    pub a_blow: Length,
    /// Size drift rate, negative when grains shrink
    pub ds_dt: Velocity,
    /// External mass production
    pub production: SurfaceDensityRate,
    /// Cell area (m²) used to turn surface rates into mass rates
    pub area_m2: f64,
}

impl StepInputs {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("dt", self.dt.to_seconds())?;
        ensure_positive("omega", self.omega.to_rad_per_sec())?;
        ensure_positive("v_k", self.v_k.to_meters_per_sec())?;
        ensure_positive("r", self.r.to_meters())?;
        ensure_non_negative("tau_eff", self.tau_eff)?;
        ensure_non_negative("a_blow", self.a_blow.to_meters())?;
        ensure_finite("ds_dt", self.ds_dt.to_meters_per_sec())?;
        ensure_non_negative("production rate", self.production.to_kg_per_m2_per_sec())?;
        ensure_positive("cell area", self.area_m2)?;
        Ok(())
    }
}

/// Everything a caller may want to log or plot about a step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDiagnostics {
    /// dt / t_blow over the whole step
    pub blowout_ratio: f64,
    pub ratio_flags: RatioFlags,
    pub correction_applied: bool,
    /// Effective blow-out efficiency of the last sub-step
    pub chi_eff: f64,
    pub substeps: usize,
    /// Kernel-minimum collision time (s) at the start of the step
    pub t_coll_min: f64,
    /// True when the depletion limiter scaled any pair rate
    pub collision_rate_limited: bool,
    /// Bins that drifted across the blow-out size
    pub crossed_bins: usize,
    /// Entries clamped to zero by sanitize
    pub sanitized_entries: usize,
    pub mass_budget: MassBudgetReport,
    pub backend: &'static str,
    pub advice: TimestepAdvice,
}

/// Outflow rates and the state summary after one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub dsigma_dt_blowout: SurfaceDensityRate,
    pub dsigma_dt_sublimation: SurfaceDensityRate,
    pub mass_loss_rate_blowout: MassRate,
    pub mass_loss_rate_sublimation: MassRate,
    pub surface_density: SurfaceDensity,
    pub diagnostics: StepDiagnostics,
}

/// Advances the PSD of one cell at a time.
#[derive(Debug)]
pub struct CellStepper {
    config: CascadeConfig,
    kernels: KernelDispatch,
    blowout: BlowoutSink,
    sublimation: SublimationDrift,
    supply: SupplySource,
    lookup: Option<Arc<LookupService>>,
}

impl CellStepper {
    /// Validate `config` and select the kernel backend.
    pub fn new(config: CascadeConfig) -> Result<Self> {
        let kernels = KernelDispatch::new(config.backend);
        Self::with_kernels(config, kernels)
    }

    /// Use an already constructed backend dispatch.
    pub fn with_kernels(config: CascadeConfig, kernels: KernelDispatch) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            blowout: BlowoutSink::new(config.blowout.clone()),
            sublimation: SublimationDrift::new(config.sublimation.clone()),
            supply: SupplySource::new(config.supply.clone()),
            kernels,
            config,
            lookup: None,
        })
    }

    /// Use a private lookup service instead of the process-wide one.
    pub fn with_lookup(mut self, lookup: Arc<LookupService>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn kernels(&self) -> &KernelDispatch {
        &self.kernels
    }

    pub fn lookup(&self) -> &LookupService {
        match &self.lookup {
            Some(lookup) => lookup.as_ref(),
            None => LookupService::global(),
        }
    }

    /// Advance `state` by `inputs.dt`.
    ///
    /// On a strict mass-budget failure the state is restored to its value
    /// before the step and the error is returned, so the caller can retry
    /// with a smaller dt.
    pub fn step(&self, state: &mut PsdState, inputs: &StepInputs) -> Result<StepResult> {
        inputs.validate()?;
        for &n in state.number() {
            ensure_non_negative("number density", n)?;
        }

        let dt = inputs.dt.to_seconds();
        let omega = inputs.omega.to_rad_per_sec();
        let v_k = inputs.v_k.to_meters_per_sec();
        let a_blow = inputs.a_blow.to_meters();
        let production = match self.supply.mode() {
            SupplyMode::Off => 0.0,
            _ => inputs.production.to_kg_per_m2_per_sec(),
        };

        let grid = state.grid().clone();
        let sizes = grid.sizes().to_vec();
        let mass = state.mass().to_vec();
        let rho = state.rho();
        let n_old = state.number().to_vec();

        let dynamics = DynamicalInputs {
            v_k,
            r: inputs.r.to_meters(),
            tau_eff: inputs.tau_eff,
        };
        let profile = self.config.dynamics.profile(grid.n_bins(), &dynamics)?;
        let velocities = pair_velocities(&profile, v_k)?;
        let kernel = collision_kernel(
            &sizes,
            &mass,
            &profile,
            &velocities,
            self.config.dynamics.gravitational_focusing,
        )?;

        let fragmentation = &self.config.fragmentation;
        let outcomes =
            fragmentation.pair_outcomes(&mass, grid.edges(), &velocities, rho, self.lookup())?;
        let tensor = self
            .kernels
            .fragment_tensor(grid.edges(), &outcomes, fragmentation.alpha);
        let source = self.supply.number_rates(&grid, &mass, production)?;

        let plan = self.blowout.plan(dt, omega)?;
        let h = dt / plan.substeps as f64;
        let cap = self.config.collision_depletion_cap;

        let mut t_coll_min = f64::INFINITY;
        let mut limited_any = false;
        let mut blowout_mass = 0.0;
        let mut correction_applied = false;
        let mut chi_eff = 1.0;
        let mut sanitized_entries = 0;

        for substep in 0..plan.substeps {
            let number = state.number_mut();
            let rates = self.kernels.collision_rates(&kernel, number);
            let loss = self.kernels.loss(&rates);
            if substep == 0 {
                t_coll_min = min_collision_time(&loss, number);
            }

            let limited = limit_pair_rates(&rates, &loss, number, h, cap);
            let loss = if limited.limited {
                limited_any = true;
                self.kernels.loss(&limited.rates)
            } else {
                loss
            };
            let gain = self.kernels.gain(&limited.rates, &tensor, &mass);

            for (k, n) in number.iter_mut().enumerate() {
                *n += h * (gain[k] - loss[k] + source[k]);
            }

            let removal = self
                .blowout
                .apply(number, &sizes, &mass, a_blow, h, plan.t_blow);
            blowout_mass += removal.mass;
            correction_applied |= removal.correction_applied;
            chi_eff = removal.chi_eff;

            sanitized_entries += state.sanitize();
        }

        let drift = self.sublimation.apply(
            state.number_mut(),
            &grid,
            &mass,
            rho,
            inputs.ds_dt.to_meters_per_sec(),
            dt,
            a_blow,
        )?;
        blowout_mass += drift.blowout;
        let sublimation_mass = drift.sublimation;
        sanitized_entries += state.sanitize();

        let per_second = |m: f64| if dt > 0.0 { m / dt } else { 0.0 };
        let blowout_rate = per_second(blowout_mass);
        let sublimation_rate = per_second(sublimation_mass);

        let report = self.config.budget.audit(
            &n_old,
            state.number(),
            &mass,
            production,
            dt,
            blowout_rate + sublimation_rate,
        )?;
        if let Err(err) = report.enforce() {
            state.set_number(&n_old)?;
            return Err(err);
        }

        let advice = self
            .config
            .timestep
            .advise(t_coll_min, omega, self.config.blowout.chi_blow)?;

        log::debug!(
            "step dt={dt:.3e}s substeps={} ratio={:.3} t_coll={t_coll_min:.3e}s \
             blowout={blowout_rate:.3e} sublimation={sublimation_rate:.3e} kg/m²/s \
             budget={:.2e} backend={}",
            plan.substeps,
            plan.ratio,
            report.relative_error,
            self.kernels.name(),
        );

        let dsigma_dt_blowout = SurfaceDensityRate::from_kg_per_m2_per_sec(blowout_rate);
        let dsigma_dt_sublimation = SurfaceDensityRate::from_kg_per_m2_per_sec(sublimation_rate);

        Ok(StepResult {
            dsigma_dt_blowout,
            dsigma_dt_sublimation,
            mass_loss_rate_blowout: dsigma_dt_blowout.over_area(inputs.area_m2),
            mass_loss_rate_sublimation: dsigma_dt_sublimation.over_area(inputs.area_m2),
            surface_density: state.surface_density(),
            diagnostics: StepDiagnostics {
                blowout_ratio: plan.ratio,
                ratio_flags: plan.flags,
                correction_applied,
                chi_eff,
                substeps: plan.substeps,
                t_coll_min,
                collision_rate_limited: limited_any,
                crossed_bins: drift.crossed_bins,
                sanitized_entries,
                mass_budget: report,
                backend: self.kernels.name(),
                advice,
            },
        })
    }
}
