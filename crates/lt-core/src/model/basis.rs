//! Exponential basis kernels for influence curves.
//!
//! The influence of a source type on a target rate is modeled as a linear
//! combination of exponential kernels `e^{-dh/tau}` at fixed timescales.
//! The exponential form is load-bearing: it is what allows the history sum
//! to be maintained recursively under decay plus unit impulses instead of
//! re-scanning past events.

use lt_math::log_spaced;

/// Milliseconds per hour; internal model time is fractional hours.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Number of available basis timescales.
pub const MAX_BASES: usize = 9;

/// Basis decay timescales in hours: 5 min up to 21 days.
pub const TIMESCALES_HOURS: [f64; MAX_BASES] = [
    5.0 / 60.0,
    15.0 / 60.0,
    1.0,
    4.0,
    12.0,
    24.0,
    72.0,
    168.0,
    504.0,
];

/// Lag-sweep range for peak detection, in hours.
const PEAK_SWEEP_LO_H: f64 = 5.0 / 60.0;
const PEAK_SWEEP_HI_H: f64 = 168.0;
const PEAK_SWEEP_POINTS: usize = 200;

/// Lag range for the mass integral, in hours.
const MASS_LO_H: f64 = 1.0 / 60.0;
const MASS_HI_H: f64 = 168.0;
const MASS_POINTS: usize = 500;

/// Influence horizon for the closed-form integrated effect, in hours.
const HORIZON_H: f64 = 168.0;

/// Kernel value `e^{-dh/tau}` for a positive lag, zero otherwise.
pub fn kernel(tau: f64, delta_hours: f64) -> f64 {
    if delta_hours > 0.0 {
        (-delta_hours / tau).exp()
    } else {
        0.0
    }
}

/// Decay factor applied to recursive state over an elapsed interval.
pub fn decay(delta_hours: f64, tau: f64) -> f64 {
    (-delta_hours / tau).exp()
}

/// Influence curve `g(dh) = sum_b w_b * kernel(tau_b, dh)`.
pub fn curve(weights: &[f64], delta_hours: f64) -> f64 {
    weights
        .iter()
        .zip(TIMESCALES_HOURS.iter())
        .map(|(w, tau)| w * kernel(*tau, delta_hours))
        .sum()
}

/// Lag maximizing `|g|` over a 200-point log grid, with the curve value there.
///
/// Returns `(peak_lag_ms, g(peak_lag))`.
pub fn peak_lag(weights: &[f64]) -> (f64, f64) {
    let grid = log_spaced(PEAK_SWEEP_LO_H, PEAK_SWEEP_HI_H, PEAK_SWEEP_POINTS);
    let mut best_lag_h = PEAK_SWEEP_LO_H;
    let mut best_value = curve(weights, PEAK_SWEEP_LO_H);
    for &dh in &grid {
        let g = curve(weights, dh);
        if g.abs() > best_value.abs() {
            best_lag_h = dh;
            best_value = g;
        }
    }
    (best_lag_h * MS_PER_HOUR, best_value)
}

/// Lag by which half the total absolute influence mass has accumulated.
///
/// Integrates `|g|` over a 500-point log grid; returns 0 when the total
/// absolute mass is below 1e-10. Returned in milliseconds.
pub fn half_mass_time_ms(weights: &[f64]) -> f64 {
    let grid = log_spaced(MASS_LO_H, MASS_HI_H, MASS_POINTS);
    let mut masses = Vec::with_capacity(grid.len());
    let mut total = 0.0;
    for pair in grid.windows(2) {
        let m = curve(weights, pair[1]).abs() * (pair[1] - pair[0]);
        masses.push((pair[1], m));
        total += m;
    }
    if total < 1e-10 {
        return 0.0;
    }
    let mut cum = 0.0;
    for (dh, m) in masses {
        cum += m;
        if cum >= 0.5 * total {
            return dh * MS_PER_HOUR;
        }
    }
    MASS_HI_H * MS_PER_HOUR
}

/// Closed-form `sum_b w_b * tau_b * (1 - e^{-168/tau_b})`.
///
/// The integral of the influence curve out to the one-week horizon.
pub fn integrated_effect(weights: &[f64]) -> f64 {
    weights
        .iter()
        .zip(TIMESCALES_HOURS.iter())
        .map(|(w, tau)| w * tau * (1.0 - (-HORIZON_H / tau).exp()))
        .sum()
}
