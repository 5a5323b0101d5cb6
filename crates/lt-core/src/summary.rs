//! Influence-edge and baseline-rhythm summaries of a fitted model.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::model::basis::{curve, half_mass_time_ms, integrated_effect, peak_lag};
use crate::model::features::BASELINE_DIM;
use crate::model::fit::FullModelFit;

/// Integrated-effect threshold separating excitation/inhibition from noise.
const DIRECTION_THRESHOLD: f64 = 0.1;

/// Fixed hazard-ratio report lags, in hours.
const HR_LAGS_H: [f64; 3] = [0.25, 1.0, 6.0];

/// Direction of an influence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    Excite,
    Inhibit,
    Neutral,
}

impl std::fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeDirection::Excite => write!(f, "excite"),
            EdgeDirection::Inhibit => write!(f, "inhibit"),
            EdgeDirection::Neutral => write!(f, "neutral"),
        }
    }
}

/// One directed influence edge between event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluenceEdge {
    pub source: String,
    pub target: String,
    /// Lag of the largest absolute influence, in milliseconds.
    pub peak_lag_ms: f64,
    /// Influence-curve value at the peak lag.
    pub peak_effect: f64,
    /// Lag by which half the absolute influence mass has accumulated, ms.
    pub mass_time_ms: f64,
    /// Closed-form influence integral out to one week.
    pub integrated_effect: f64,
    /// Hazard ratios at the peak lag and at fixed horizons.
    pub hr_at_peak: f64,
    pub hr_at_15m: f64,
    pub hr_at_1h: f64,
    pub hr_at_6h: f64,
    pub direction: EdgeDirection,
    /// Compressed edge strength in `[0, 1)`.
    pub strength: f64,
    /// Raw per-basis weights.
    pub weights: Vec<f64>,
}

/// Baseline rhythm summary for one event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSummary {
    pub type_name: String,
    /// Intercept log-rate (events per hour, log scale).
    pub intercept: f64,
    /// Hour of day with the highest baseline rate, in `[0, 24)`.
    pub hour_peak: f64,
    /// First-harmonic amplitude of the hour-of-day rhythm.
    pub hour_amp: f64,
    /// Day of week with the highest baseline rate, `0 = Sunday`.
    pub dow_peak: u8,
    /// Amplitude of the day-of-week rhythm.
    pub dow_amp: f64,
}

/// Extract influence edges from a fitted model, strongest first.
pub fn extract_edges(fit: &FullModelFit, min_strength: f64) -> Vec<InfluenceEdge> {
    let params = &fit.params;
    let mut edges = Vec::new();

    for (&target, _) in fit.fits.iter() {
        for source in 0..params.num_types {
            if source == target {
                continue;
            }
            let weights = params.influence_weights(target, source);
            let l1: f64 = weights.iter().map(|w| w.abs()).sum();
            if l1 < min_strength {
                continue;
            }

            let (peak_lag_ms, peak_effect) = peak_lag(weights);
            let integrated = integrated_effect(weights);
            let direction = if integrated > DIRECTION_THRESHOLD {
                EdgeDirection::Excite
            } else if integrated < -DIRECTION_THRESHOLD {
                EdgeDirection::Inhibit
            } else {
                EdgeDirection::Neutral
            };

            edges.push(InfluenceEdge {
                source: fit.type_names[source].clone(),
                target: fit.type_names[target].clone(),
                peak_lag_ms,
                peak_effect,
                mass_time_ms: half_mass_time_ms(weights),
                integrated_effect: integrated,
                hr_at_peak: peak_effect.exp(),
                hr_at_15m: curve(weights, HR_LAGS_H[0]).exp(),
                hr_at_1h: curve(weights, HR_LAGS_H[1]).exp(),
                hr_at_6h: curve(weights, HR_LAGS_H[2]).exp(),
                direction,
                strength: l1 / (1.0 + l1),
                weights: weights.to_vec(),
            });
        }
    }

    edges.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });
    edges
}

/// Extract baseline rhythm summaries for every fitted type.
pub fn extract_baselines(fit: &FullModelFit) -> Vec<BaselineSummary> {
    let mut out = Vec::new();
    for (&k, _) in fit.fits.iter() {
        let beta = &fit.params.beta[k * BASELINE_DIM..(k + 1) * BASELINE_DIM];

        let hour_amp = beta[1].hypot(beta[2]);
        let hour_phase = beta[1].atan2(beta[2]);
        let hour_peak = (24.0 * hour_phase / TAU).rem_euclid(24.0);

        let dow_amp = beta[5].hypot(beta[6]);
        let dow_phase = beta[5].atan2(beta[6]);
        let dow_peak = ((7.0 * dow_phase / TAU).rem_euclid(7.0)).round() as u8 % 7;

        out.push(BaselineSummary {
            type_name: fit.type_names[k].clone(),
            intercept: beta[0],
            hour_peak,
            hour_amp,
            dow_peak,
            dow_amp,
        });
    }
    out
}
