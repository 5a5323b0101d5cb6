//! Regularized log-likelihood and gradient for one target type.
//!
//! For target `k` over the observation windows `W`:
//!
//! ```text
//! L = sum_{events e of type k} eta_k(t_e, S(t_e-))
//!   - integral_W lambda_k(t) dt
//!   - lambda1 * |theta_k|_1 - lambda2 * |theta_k|_2^2
//! ```
//!
//! The integral uses left-rectangle quadrature with a fixed number of points
//! per window. Quadrature ticks and events are consumed in one time-ordered
//! merge: at equal instants ticks are scored first, and all events sharing a
//! timestamp are scored against the pre-impulse state before any of their
//! impulses land. One linear pass suffices because the recursive state makes
//! `sum_s sum_b theta * S` exact under exponential kernels.

use lt_math::{clamp, safe_exp, sign, zero_non_finite, EXP_CLAMP};

use crate::model::basis::MS_PER_HOUR;
use crate::model::features::{baseline_features, BASELINE_DIM};
use crate::model::params::ModelParams;
use crate::model::state::RecursiveState;
use crate::stream::EventStream;
use crate::windows::ObservationWindow;

/// Quadrature points per window during fitting.
pub const QUAD_POINTS_FIT: usize = 50;

/// Quadrature points per integration segment in diagnostics.
pub const QUAD_POINTS_DIAG: usize = 20;

/// Log-likelihood and gradient for one target type.
#[derive(Debug, Clone)]
pub struct TargetGrad {
    pub log_lik: f64,
    pub grad_beta: [f64; BASELINE_DIM],
    /// Gradient over `theta[target]`, indexed `source * num_bases + basis`.
    /// The `source == target` block stays zero.
    pub grad_theta: Vec<f64>,
}

/// Linear predictor `eta_k(t, S)` for a target type.
pub(crate) fn linear_predictor(
    params: &ModelParams,
    target: usize,
    feats: &[f64; BASELINE_DIM],
    state: &RecursiveState,
) -> f64 {
    let beta = params.beta_row(target);
    let mut eta = 0.0;
    for j in 0..BASELINE_DIM {
        eta += beta[j] * feats[j];
    }
    for s in 0..params.num_types {
        if s == target {
            continue;
        }
        let weights = params.influence_weights(target, s);
        let sums = state.source(s);
        for b in 0..params.num_bases {
            eta += weights[b] * sums[b];
        }
    }
    eta
}

struct Accum {
    ll: f64,
    grad_beta: [f64; BASELINE_DIM],
    grad_theta: Vec<f64>,
}

/// Compute the regularized log-likelihood and gradient for `target`.
pub fn target_log_likelihood(
    stream: &EventStream,
    windows: &[ObservationWindow],
    params: &ModelParams,
    target: usize,
    lambda1: f64,
    lambda2: f64,
    quad_points: usize,
) -> TargetGrad {
    let nb = params.num_bases;
    let mut state = RecursiveState::new(params.num_types, nb);
    let mut acc = Accum {
        ll: 0.0,
        grad_beta: [0.0; BASELINE_DIM],
        grad_theta: vec![0.0; params.num_types * nb],
    };

    let q = quad_points.max(1);
    let mut e = 0usize;
    for w in windows {
        let len_ms = w.len_ms() as f64;
        if len_ms <= 0.0 {
            continue;
        }
        let dt_hours = len_ms / MS_PER_HOUR / q as f64;
        for j in 0..q {
            let tick_ms = w.start_ms as f64 + len_ms * j as f64 / q as f64;
            flush_events_before(stream, params, target, &mut state, &mut acc, &mut e, tick_ms);
            score_tick(params, target, &mut state, &mut acc, tick_ms, dt_hours);
        }
        flush_events_before(
            stream,
            params,
            target,
            &mut state,
            &mut acc,
            &mut e,
            w.end_ms as f64,
        );
    }

    // Regularization over the off-diagonal influence rows.
    for s in 0..params.num_types {
        if s == target {
            continue;
        }
        let weights = params.influence_weights(target, s);
        for b in 0..nb {
            let th = weights[b];
            acc.ll -= lambda1 * th.abs() + lambda2 * th * th;
            acc.grad_theta[s * nb + b] -= lambda1 * sign(th) + 2.0 * lambda2 * th;
        }
    }

    // Numerical degeneracy never reaches the optimizer.
    acc.ll = zero_non_finite(acc.ll);
    for g in acc.grad_beta.iter_mut() {
        *g = zero_non_finite(*g);
    }
    for g in acc.grad_theta.iter_mut() {
        *g = zero_non_finite(*g);
    }

    TargetGrad {
        log_lik: acc.ll,
        grad_beta: acc.grad_beta,
        grad_theta: acc.grad_theta,
    }
}

/// Score and absorb every event group strictly before `before_ms`.
fn flush_events_before(
    stream: &EventStream,
    params: &ModelParams,
    target: usize,
    state: &mut RecursiveState,
    acc: &mut Accum,
    e: &mut usize,
    before_ms: f64,
) {
    let n = stream.len();
    let nb = params.num_bases;
    while *e < n && (stream.times_ms[*e] as f64) < before_ms {
        let t_ms = stream.times_ms[*e];
        state.advance(t_ms as f64 / MS_PER_HOUR);

        let group_start = *e;
        let mut group_end = *e;
        while group_end < n && stream.times_ms[group_end] == t_ms {
            group_end += 1;
        }

        let target_hits = stream.type_idx[group_start..group_end]
            .iter()
            .filter(|&&ty| ty == target)
            .count();
        if target_hits > 0 {
            let hits = target_hits as f64;
            let feats = baseline_features(t_ms as f64);
            let eta = linear_predictor(params, target, &feats, state);
            acc.ll += clamp(eta, -EXP_CLAMP, EXP_CLAMP) * hits;
            for j in 0..BASELINE_DIM {
                acc.grad_beta[j] += feats[j] * hits;
            }
            for s in 0..params.num_types {
                if s == target {
                    continue;
                }
                let sums = state.source(s);
                for b in 0..nb {
                    acc.grad_theta[s * nb + b] += sums[b] * hits;
                }
            }
        }

        for i in group_start..group_end {
            state.add_event(stream.type_idx[i]);
        }
        *e = group_end;
    }
}

/// One left-rectangle quadrature tick.
fn score_tick(
    params: &ModelParams,
    target: usize,
    state: &mut RecursiveState,
    acc: &mut Accum,
    tick_ms: f64,
    dt_hours: f64,
) {
    state.advance(tick_ms / MS_PER_HOUR);
    let feats = baseline_features(tick_ms);
    let eta = linear_predictor(params, target, &feats, state);
    let lambda = safe_exp(eta);

    acc.ll -= lambda * dt_hours;
    for j in 0..BASELINE_DIM {
        acc.grad_beta[j] -= lambda * feats[j] * dt_hours;
    }
    let nb = params.num_bases;
    for s in 0..params.num_types {
        if s == target {
            continue;
        }
        let sums = state.source(s);
        for b in 0..nb {
            acc.grad_theta[s * nb + b] -= lambda * sums[b] * dt_hours;
        }
    }
}
