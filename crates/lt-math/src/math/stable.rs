//! Numerically stable scalar primitives for intensity math.

/// Exponent bound applied before exponentiation.
///
/// `exp(20)` is about 4.85e8, comfortably inside f64 range even after being
/// multiplied by long quadrature intervals.
pub const EXP_CLAMP: f64 = 20.0;

/// Clamp a value into `[lo, hi]`, mapping NaN to `lo`.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        return lo;
    }
    x.max(lo).min(hi)
}

/// `exp(x)` with the exponent clamped to `[-EXP_CLAMP, EXP_CLAMP]`.
///
/// Keeps the intensity strictly positive and finite for any finite or
/// non-finite linear predictor.
pub fn safe_exp(x: f64) -> f64 {
    clamp(x, -EXP_CLAMP, EXP_CLAMP).exp()
}

/// Replace a non-finite value with zero.
pub fn zero_non_finite(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Sign of `x` as -1, 0, or +1. NaN maps to 0.
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Logarithmically spaced grid of `n` points over `[lo, hi]`.
///
/// Requires `0 < lo < hi` and `n >= 2`; returns an empty vector otherwise.
/// The first point is exactly `lo` and the last exactly `hi`.
pub fn log_spaced(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if !(lo > 0.0) || !(hi > lo) || n < 2 {
        return Vec::new();
    }
    let log_lo = lo.ln();
    let step = (hi.ln() - log_lo) / (n - 1) as f64;
    let mut grid = Vec::with_capacity(n);
    for i in 0..n {
        grid.push((log_lo + step * i as f64).exp());
    }
    // Pin the endpoints so accumulated rounding cannot move them.
    grid[0] = lo;
    grid[n - 1] = hi;
    grid
}
