//! Per-target fitting with Adam.
//!
//! Each eligible target type is fit independently: only its baseline row and
//! its influence row move, so the full model assembles from per-target
//! ascent runs over a shared parameter block. The loop is deterministic:
//! fixed iteration order, no randomness in initialization.

use std::collections::BTreeMap;

use serde::Serialize;

use lt_common::{Error, Result};

use crate::config::AnalysisOptions;
use crate::model::basis::MS_PER_HOUR;
use crate::model::features::BASELINE_DIM;
use crate::model::likelihood::{target_log_likelihood, QUAD_POINTS_FIT};
use crate::model::params::ModelParams;
use crate::stream::EventStream;
use crate::windows::{total_observed_ms, ObservationWindow};

/// Minimum number of events of a type before it is fit as a target.
pub const MIN_TARGET_EVENTS: usize = 10;

/// Convergence tolerance on the log-likelihood change.
const LL_TOLERANCE: f64 = 1e-6;

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-8;

/// Outcome of one per-target fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    /// Final log-likelihood at the reported parameters.
    pub log_likelihood: f64,
    /// Whether `|delta L|` fell below tolerance before the iteration cap.
    pub converged: bool,
    /// Number of iterations executed.
    pub iterations: usize,
}

/// Aggregated fit across all eligible targets.
#[derive(Debug, Clone, Serialize)]
pub struct FullModelFit {
    pub params: ModelParams,
    /// Per-target results, keyed by type index. Only eligible targets appear.
    pub fits: BTreeMap<usize, FitResult>,
    pub type_names: Vec<String>,
}

impl FullModelFit {
    /// True when at least one target was fit.
    pub fn any_fitted(&self) -> bool {
        !self.fits.is_empty()
    }
}

/// Fit every eligible target type.
///
/// `on_target` is invoked after each target completes with
/// `(finished, eligible, type_name)`; returning `false` cancels the run
/// before the next target starts (the cooperative yield point).
pub fn fit_all(
    stream: &EventStream,
    windows: &[ObservationWindow],
    options: &AnalysisOptions,
    mut on_target: impl FnMut(usize, usize, &str) -> bool,
) -> Result<FullModelFit> {
    let total_hours = total_observed_ms(windows) as f64 / MS_PER_HOUR;
    let mut params = ModelParams::init_from_data(stream, total_hours, options.num_bases);

    let eligible: Vec<usize> = (0..stream.num_types())
        .filter(|&k| stream.type_counts[k] >= MIN_TARGET_EVENTS)
        .collect();

    let mut fits = BTreeMap::new();
    for (i, &target) in eligible.iter().enumerate() {
        let result = fit_target(stream, windows, &mut params, target, options);
        fits.insert(target, result);
        tracing::debug!(
            target_type = %stream.type_names[target],
            log_likelihood = result.log_likelihood,
            iterations = result.iterations,
            converged = result.converged,
            "target fit complete"
        );
        if !on_target(i + 1, eligible.len(), &stream.type_names[target]) {
            return Err(Error::Cancelled);
        }
    }

    Ok(FullModelFit {
        params,
        fits,
        type_names: stream.type_names.clone(),
    })
}

/// Adam ascent on one target's baseline and influence rows.
fn fit_target(
    stream: &EventStream,
    windows: &[ObservationWindow],
    params: &mut ModelParams,
    target: usize,
    options: &AnalysisOptions,
) -> FitResult {
    let nb = params.num_bases;
    let dim = BASELINE_DIM + params.num_types * nb;
    let mut m = vec![0.0; dim];
    let mut v = vec![0.0; dim];

    let mut prev_ll = f64::NEG_INFINITY;
    let mut last_ll = f64::NEG_INFINITY;
    let mut converged = false;
    let mut iterations = 0;

    for iter in 1..=options.max_iter {
        iterations = iter;
        let grad = target_log_likelihood(
            stream,
            windows,
            params,
            target,
            options.lambda1,
            options.lambda2,
            QUAD_POINTS_FIT,
        );
        last_ll = grad.log_lik;

        // Ascent step; bias-corrected first and second moments.
        let b1t = 1.0 - ADAM_BETA1.powi(iter as i32);
        let b2t = 1.0 - ADAM_BETA2.powi(iter as i32);
        let mut step = |slot: usize, g: f64, value: &mut f64| {
            m[slot] = ADAM_BETA1 * m[slot] + (1.0 - ADAM_BETA1) * g;
            v[slot] = ADAM_BETA2 * v[slot] + (1.0 - ADAM_BETA2) * g * g;
            let m_hat = m[slot] / b1t;
            let v_hat = v[slot] / b2t;
            *value += options.learning_rate * m_hat / (v_hat.sqrt() + ADAM_EPS);
        };

        for j in 0..BASELINE_DIM {
            let slot = target * BASELINE_DIM + j;
            let mut value = params.beta[slot];
            step(j, grad.grad_beta[j], &mut value);
            params.beta[slot] = value;
        }
        for i in 0..params.num_types * nb {
            // The diagonal source block has zero gradient and never moves.
            let mut value = params.theta[target][i];
            step(BASELINE_DIM + i, grad.grad_theta[i], &mut value);
            params.theta[target][i] = value;
        }
        params.sanitize_target(target);

        if (grad.log_lik - prev_ll).abs() < LL_TOLERANCE {
            converged = true;
            break;
        }
        prev_ll = grad.log_lik;
    }

    FitResult {
        log_likelihood: last_ll,
        converged,
        iterations,
    }
}
