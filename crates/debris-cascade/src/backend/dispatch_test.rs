//! Tests for backend selection and fallback.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;

use crate::backend::{
    AcceleratedKernels, BackendPreference, KernelDispatch, NumericKernels, ReferenceKernels,
};
use crate::collisions::{FragmentTensor, PairMatrix, PairOutcomes};

/// Accelerated stand-in that fails in a chosen way once armed and counts
/// its faulty calls.
struct FaultyKernels {
    calls: Arc<AtomicUsize>,
    armed: Arc<AtomicBool>,
    fault: Fault,
}

#[derive(Clone, Copy)]
enum Fault {
    Panic,
    NonFinite,
    /// Finite but wrong by a factor of two
    Disagree,
}

impl NumericKernels for FaultyKernels {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn collision_rates(&self, kernel: &PairMatrix, number: &[f64]) -> PairMatrix {
        ReferenceKernels.collision_rates(kernel, number)
    }

    fn fragment_tensor(&self, edges: &[f64], outcomes: &PairOutcomes, alpha: f64) -> FragmentTensor {
        ReferenceKernels.fragment_tensor(edges, outcomes, alpha)
    }

    fn loss(&self, rates: &PairMatrix) -> Vec<f64> {
        if !self.armed.load(Ordering::SeqCst) {
            return ReferenceKernels.loss(rates);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            Fault::Panic => panic!("simulated kernel fault"),
            Fault::NonFinite => vec![f64::NAN; rates.n()],
            Fault::Disagree => ReferenceKernels.loss(rates).iter().map(|l| 2.0 * l).collect(),
        }
    }

    fn gain(&self, rates: &PairMatrix, tensor: &FragmentTensor, mass: &[f64]) -> Vec<f64> {
        ReferenceKernels.gain(rates, tensor, mass)
    }
}

fn dispatch_over(
    fault: Fault,
    armed: bool,
    preference: BackendPreference,
) -> (KernelDispatch, Arc<AtomicUsize>, Arc<AtomicBool>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let armed = Arc::new(AtomicBool::new(armed));
    let dispatch = KernelDispatch::with_backends(
        Box::new(ReferenceKernels),
        Some(Box::new(FaultyKernels {
            calls: Arc::clone(&calls),
            armed: Arc::clone(&armed),
            fault,
        })),
        preference,
    );
    (dispatch, calls, armed)
}

/// Passes the startup probe, then fails at run time.
fn faulty_dispatch(fault: Fault) -> (KernelDispatch, Arc<AtomicUsize>) {
    let (dispatch, calls, armed) = dispatch_over(fault, false, BackendPreference::Accelerated);
    assert!(!dispatch.has_fallen_back());
    armed.store(true, Ordering::SeqCst);
    (dispatch, calls)
}

fn sample_rates() -> PairMatrix {
    PairMatrix::from_upper(3, |i, j| (1 + i + j) as f64)
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn auto_selects_accelerated_when_probe_passes() {
    let dispatch = KernelDispatch::new(BackendPreference::Auto);

    assert_eq!(dispatch.name(), "accelerated");
    assert!(!dispatch.has_fallen_back());
}

#[test]
fn reference_preference_never_uses_fast_path() {
    let dispatch = KernelDispatch::new(BackendPreference::Reference);

    assert_eq!(dispatch.name(), "reference");
    assert!(!dispatch.has_fallen_back());
}

#[test]
fn auto_rejects_backend_that_fails_probe() {
    let (dispatch, _, _) = dispatch_over(Fault::NonFinite, true, BackendPreference::Auto);

    assert!(dispatch.has_fallen_back());
    assert_eq!(dispatch.name(), "reference");
    assert!(dispatch.fallback_reason().unwrap().contains("probe"));
}

#[test]
fn explicit_accelerated_is_probed_for_agreement() {
    let (dispatch, calls, _) =
        dispatch_over(Fault::Disagree, true, BackendPreference::Accelerated);

    assert!(dispatch.has_fallen_back());
    assert_eq!(dispatch.name(), "reference");
    let reason = dispatch.fallback_reason().unwrap();
    assert!(reason.contains("probe") && reason.contains("loss"));

    // Finite but wrong output would slip past the runtime checks
    let rates = sample_rates();
    assert_eq!(dispatch.loss(&rates), ReferenceKernels.loss(&rates));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Runtime fallback
// =============================================================================

#[test]
fn panic_falls_back_once_and_stays_on_reference() {
    let (dispatch, calls) = faulty_dispatch(Fault::Panic);
    let rates = sample_rates();
    let expected = ReferenceKernels.loss(&rates);

    for _ in 0..5 {
        assert_eq!(dispatch.loss(&rates), expected);
    }

    // Only the first call reached the faulty path
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(dispatch.has_fallen_back());
    assert_eq!(dispatch.name(), "reference");
    assert!(dispatch.fallback_reason().unwrap().contains("simulated kernel fault"));
}

#[test]
fn non_finite_output_triggers_fallback() {
    let (dispatch, calls) = faulty_dispatch(Fault::NonFinite);
    let rates = sample_rates();

    let loss = dispatch.loss(&rates);

    assert!(loss.iter().all(|v| v.is_finite()));
    assert_relative_eq!(loss[0], 1.0 + 2.0 + 3.0);
    assert!(dispatch.fallback_reason().unwrap().contains("non-finite"));

    dispatch.loss(&rates);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_failures_record_one_transition() {
    let (dispatch, calls) = faulty_dispatch(Fault::NonFinite);
    let rates = sample_rates();
    let expected = ReferenceKernels.loss(&rates);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..10 {
                    assert_eq!(dispatch.loss(&rates), expected);
                }
            });
        }
    });

    assert!(dispatch.has_fallen_back());
    // Threads racing the first failure may each hit the faulty path once
    let hits = calls.load(Ordering::SeqCst);
    assert!((1..=8).contains(&hits));
}

#[test]
fn healthy_accelerated_matches_reference() {
    let dispatch = KernelDispatch::new(BackendPreference::Accelerated);
    let rates = sample_rates();

    let fast = dispatch.loss(&rates);
    let slow = ReferenceKernels.loss(&rates);
    for (a, b) in fast.iter().zip(&slow) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
    assert_eq!(AcceleratedKernels.name(), dispatch.name());
}
