//! Point-process GLM parameter block.

use serde::{Deserialize, Serialize};

use lt_math::{clamp, zero_non_finite};

use crate::model::features::BASELINE_DIM;
use crate::stream::EventStream;

/// Hard bound on every coefficient.
pub const PARAM_CLAMP: f64 = 50.0;

/// Parameters of the multivariate point-process GLM.
///
/// Baselines are stored per target as `beta[k * 7 + j]`; influence weights
/// per target as `theta[k][s * num_bases + b]` for source `s` and basis `b`.
/// The diagonal rows `s == k` exist but are never read or fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub num_types: usize,
    pub num_bases: usize,
    pub beta: Vec<f64>,
    pub theta: Vec<Vec<f64>>,
}

impl ModelParams {
    /// All-zero parameter block.
    pub fn new(num_types: usize, num_bases: usize) -> Self {
        ModelParams {
            num_types,
            num_bases,
            beta: vec![0.0; num_types * BASELINE_DIM],
            theta: vec![vec![0.0; num_types * num_bases]; num_types],
        }
    }

    /// Data-driven initialization: each type's intercept is seeded to the
    /// log of its smoothed empirical rate; everything else starts at zero.
    pub fn init_from_data(stream: &EventStream, total_hours: f64, num_bases: usize) -> Self {
        let mut params = ModelParams::new(stream.num_types(), num_bases);
        let hours = total_hours.max(1.0);
        for (k, &count) in stream.type_counts.iter().enumerate() {
            params.beta[k * BASELINE_DIM] = ((count as f64 + 0.5) / hours).ln();
        }
        params
    }

    /// Baseline coefficients for one target type.
    pub fn beta_row(&self, target: usize) -> &[f64] {
        &self.beta[target * BASELINE_DIM..(target + 1) * BASELINE_DIM]
    }

    /// Influence weights of `source` on `target`.
    pub fn influence_weights(&self, target: usize, source: usize) -> &[f64] {
        &self.theta[target][source * self.num_bases..(source + 1) * self.num_bases]
    }

    /// Clamp target `k`'s coefficients to the parameter box, zeroing any
    /// non-finite entries first.
    pub fn sanitize_target(&mut self, target: usize) {
        for v in
            self.beta[target * BASELINE_DIM..(target + 1) * BASELINE_DIM].iter_mut()
        {
            *v = clamp(zero_non_finite(*v), -PARAM_CLAMP, PARAM_CLAMP);
        }
        for v in self.theta[target].iter_mut() {
            *v = clamp(zero_non_finite(*v), -PARAM_CLAMP, PARAM_CLAMP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::ObservationWindow;

    fn stream_with_counts() -> EventStream {
        let events = vec![
            crate::stream::Event {
                time_ms: 1,
                type_name: "a".into(),
            },
            crate::stream::Event {
                time_ms: 2,
                type_name: "a".into(),
            },
            crate::stream::Event {
                time_ms: 3,
                type_name: "b".into(),
            },
        ];
        let windows = [ObservationWindow {
            start_ms: 0,
            end_ms: 100,
        }];
        EventStream::build(&events, &windows)
    }

    #[test]
    fn zero_init_shapes() {
        let p = ModelParams::new(3, 4);
        assert_eq!(p.beta.len(), 21);
        assert_eq!(p.theta.len(), 3);
        assert_eq!(p.theta[0].len(), 12);
    }

    #[test]
    fn intercepts_seed_to_log_rate() {
        let stream = stream_with_counts();
        let p = ModelParams::init_from_data(&stream, 10.0, 4);
        crate::assert_approx_eq!(p.beta[0], (2.5f64 / 10.0).ln(), 1e-12);
        crate::assert_approx_eq!(p.beta[BASELINE_DIM], (1.5f64 / 10.0).ln(), 1e-12);
        // Non-intercept entries stay zero.
        assert_eq!(p.beta[1], 0.0);
        assert!(p.theta.iter().all(|row| row.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn short_horizons_use_one_hour_floor() {
        let stream = stream_with_counts();
        let p = ModelParams::init_from_data(&stream, 0.001, 4);
        crate::assert_approx_eq!(p.beta[0], 2.5f64.ln(), 1e-12);
    }

    #[test]
    fn sanitize_clamps_and_zeroes() {
        let mut p = ModelParams::new(2, 2);
        p.beta[0] = 1e9;
        p.beta[1] = f64::NAN;
        p.theta[0][1] = -1e9;
        p.theta[0][2] = f64::INFINITY;
        p.sanitize_target(0);
        assert_eq!(p.beta[0], PARAM_CLAMP);
        assert_eq!(p.beta[1], 0.0);
        assert_eq!(p.theta[0][1], -PARAM_CLAMP);
        assert_eq!(p.theta[0][2], 0.0);
        // Other target untouched.
        assert_eq!(p.beta_row(1), &[0.0; BASELINE_DIM]);
    }

    #[test]
    fn influence_weights_are_per_source_blocks() {
        let mut p = ModelParams::new(2, 3);
        p.theta[1][0] = 0.1;
        p.theta[1][3] = 0.9;
        assert_eq!(p.influence_weights(1, 0), &[0.1, 0.0, 0.0]);
        assert_eq!(p.influence_weights(1, 1), &[0.9, 0.0, 0.0]);
    }
}
