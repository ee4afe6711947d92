//! Backend selection with one-way fallback.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::backend::{AcceleratedKernels, NumericKernels, ReferenceKernels};
use crate::collisions::{FragmentTensor, PairMatrix, PairOutcome, PairOutcomes};

/// Which kernel implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendPreference {
    /// Accelerated if it passes the startup probe, otherwise reference.
    #[default]
    Auto,
    Reference,
    /// Accelerated requested explicitly. It is probed like `Auto` and a
    /// disagreement with the reference path still falls back, but the
    /// fallback is logged as an error since the request was not honoured.
    Accelerated,
}

/// Routes kernel calls to the accelerated path until it misbehaves.
///
/// A panic or a non-finite output from the accelerated path switches this
/// dispatcher to the reference path for the rest of its lifetime. The
/// switch is logged once and the failing call is recomputed on the
/// reference path, so callers never see the failure.
pub struct KernelDispatch {
    reference: Box<dyn NumericKernels>,
    accelerated: Option<Box<dyn NumericKernels>>,
    fallen_back: AtomicBool,
    fallback_reason: OnceLock<String>,
}

impl std::fmt::Debug for KernelDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelDispatch")
            .field("active", &self.name())
            .field("fallback_reason", &self.fallback_reason())
            .finish()
    }
}

impl KernelDispatch {
    pub fn new(preference: BackendPreference) -> Self {
        Self::with_backends(
            Box::new(ReferenceKernels),
            Some(Box::new(AcceleratedKernels)),
            preference,
        )
    }

    /// Dispatcher over explicit implementations.
    pub fn with_backends(
        reference: Box<dyn NumericKernels>,
        accelerated: Option<Box<dyn NumericKernels>>,
        preference: BackendPreference,
    ) -> Self {
        let accelerated = match preference {
            BackendPreference::Reference => None,
            _ => accelerated,
        };
        let dispatch = Self {
            reference,
            accelerated,
            fallen_back: AtomicBool::new(false),
            fallback_reason: OnceLock::new(),
        };

        if let Some(fast) = dispatch.accelerated.as_deref() {
            if let Err(reason) = probe(dispatch.reference.as_ref(), fast) {
                if preference == BackendPreference::Accelerated {
                    log::error!("accelerated kernels were requested but disagree with the reference path");
                }
                dispatch.fall_back(format!("capability probe failed: {reason}"));
            }
        }
        log::info!("collision kernels: {} path", dispatch.name());
        dispatch
    }

    pub fn has_fallen_back(&self) -> bool {
        self.fallen_back.load(Ordering::Acquire)
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.get().map(String::as_str)
    }

    fn active_accelerated(&self) -> Option<&dyn NumericKernels> {
        if self.has_fallen_back() {
            None
        } else {
            self.accelerated.as_deref()
        }
    }

    fn fall_back(&self, reason: String) {
        if !self.fallen_back.swap(true, Ordering::AcqRel) {
            log::warn!("accelerated kernels disabled, using reference path: {reason}");
            let _ = self.fallback_reason.set(reason);
        }
    }

    /// Run `op` on the accelerated path if it is still trusted, else on
    /// the reference path.
    fn run<T>(
        &self,
        label: &str,
        op: impl Fn(&dyn NumericKernels) -> T,
        is_sound: impl Fn(&T) -> bool,
    ) -> T {
        if let Some(fast) = self.active_accelerated() {
            match catch_unwind(AssertUnwindSafe(|| op(fast))) {
                Ok(value) if is_sound(&value) => return value,
                Ok(_) => self.fall_back(format!("{label} produced non-finite values")),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    self.fall_back(format!("{label} panicked: {message}"));
                }
            }
        }
        op(self.reference.as_ref())
    }
}

impl NumericKernels for KernelDispatch {
    fn name(&self) -> &'static str {
        match self.active_accelerated() {
            Some(fast) => fast.name(),
            None => self.reference.name(),
        }
    }

    fn collision_rates(&self, kernel: &PairMatrix, number: &[f64]) -> PairMatrix {
        self.run(
            "collision_rates",
            |k| k.collision_rates(kernel, number),
            PairMatrix::all_finite,
        )
    }

    fn fragment_tensor(&self, edges: &[f64], outcomes: &PairOutcomes, alpha: f64) -> FragmentTensor {
        self.run(
            "fragment_tensor",
            |k| k.fragment_tensor(edges, outcomes, alpha),
            FragmentTensor::all_finite,
        )
    }

    fn loss(&self, rates: &PairMatrix) -> Vec<f64> {
        self.run("loss", |k| k.loss(rates), |v| all_finite(v))
    }

    fn gain(&self, rates: &PairMatrix, tensor: &FragmentTensor, mass: &[f64]) -> Vec<f64> {
        self.run("gain", |k| k.gain(rates, tensor, mass), |v| all_finite(v))
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Compare both paths on a small fixed problem.
fn probe(reference: &dyn NumericKernels, fast: &dyn NumericKernels) -> Result<(), String> {
    const N: usize = 6;
    let edges: Vec<f64> = (0..=N).map(|k| 1e-6 * 10f64.powi(k as i32)).collect();
    let mass: Vec<f64> = edges.windows(2).map(|e| (e[0] * e[1]).powf(1.5) * 1e4).collect();
    let number: Vec<f64> = (0..N).map(|k| 1e12 * 0.1f64.powi(k as i32)).collect();
    let kernel = PairMatrix::from_upper(N, |i, j| 1e-9 * (1.0 + (i + 2 * j) as f64));
    let mut outcomes = PairOutcomes::new(N);
    for i in 0..N {
        for j in i..N {
            outcomes.set_symmetric(
                i,
                j,
                PairOutcome {
                    valid: true,
                    f_lr: 0.1 + 0.05 * i as f64,
                    k_lr: j.saturating_sub(1),
                },
            );
        }
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        let c_ref = reference.collision_rates(&kernel, &number);
        let c_fast = fast.collision_rates(&kernel, &number);
        compare("collision_rates", c_ref.as_slice(), c_fast.as_slice())?;

        let y_ref = reference.fragment_tensor(&edges, &outcomes, 0.5);
        let y_fast = fast.fragment_tensor(&edges, &outcomes, 0.5);
        compare("fragment_tensor", y_ref.as_slice(), y_fast.as_slice())?;

        compare("loss", &reference.loss(&c_ref), &fast.loss(&c_ref))?;
        compare(
            "gain",
            &reference.gain(&c_ref, &y_ref, &mass),
            &fast.gain(&c_ref, &y_ref, &mass),
        )
    }));

    match result {
        Ok(outcome) => outcome,
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn compare(label: &str, expected: &[f64], found: &[f64]) -> Result<(), String> {
    if expected.len() != found.len() {
        return Err(format!("{label}: length {} vs {}", found.len(), expected.len()));
    }
    for (idx, (&a, &b)) in expected.iter().zip(found).enumerate() {
        let scale = a.abs().max(b.abs());
        if !b.is_finite() || (a - b).abs() > 1e-10 * scale {
            return Err(format!("{label}[{idx}]: {b} vs {a}"));
        }
    }
    Ok(())
}
