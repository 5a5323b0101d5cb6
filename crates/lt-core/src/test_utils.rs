//! Test support: a deterministic RNG and synthetic event-stream generators.
//!
//! Everything here is seed-driven so tests and benches reproduce exactly.
//! The generators produce millisecond timestamps directly so they can feed
//! the analysis pipeline without further conversion.

use std::f64::consts::TAU;

use crate::stream::Event;

/// Milliseconds per hour.
const HOUR_MS: f64 = 3_600_000.0;

/// Assert that two floating point numbers are approximately equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr) => {
        $crate::assert_approx_eq!($a, $b, 1e-9_f64)
    };
    ($a:expr, $b:expr, $epsilon:expr) => {{
        let a: f64 = $a;
        let b: f64 = $b;
        let eps: f64 = $epsilon;
        let diff = (a - b).abs();
        if diff > eps {
            panic!(
                "assertion failed: `(left ~= right)` (left: `{}`, right: `{}`, diff: `{}`, epsilon: `{}`)",
                a, b, diff, eps
            );
        }
    }};
}

/// Small deterministic RNG (xorshift64*). Not for cryptography; for tests.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        XorShift64 {
            state: seed.max(1).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Exponential with the given mean.
    pub fn next_exp(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.next_f64()).ln()
    }
}

/// Homogeneous Poisson event times over `[start_ms, end_ms)`.
pub fn poisson_times_ms(
    rng: &mut XorShift64,
    rate_per_hour: f64,
    start_ms: i64,
    end_ms: i64,
) -> Vec<i64> {
    let mut out = Vec::new();
    let mut t = start_ms as f64;
    loop {
        t += rng.next_exp(1.0 / rate_per_hour) * HOUR_MS;
        if t >= end_ms as f64 {
            break;
        }
        out.push(t as i64);
    }
    out
}

/// Inhomogeneous Poisson times with a diurnal rate
/// `base * exp(amp * cos(hour_angle - peak_angle))`, by thinning.
pub fn diurnal_times_ms(
    rng: &mut XorShift64,
    base_rate_per_hour: f64,
    amplitude: f64,
    peak_hour: f64,
    start_ms: i64,
    end_ms: i64,
) -> Vec<i64> {
    let rate_max = base_rate_per_hour * amplitude.exp();
    let peak_angle = TAU * peak_hour / 24.0;
    let mut out = Vec::new();
    let mut t = start_ms as f64;
    loop {
        t += rng.next_exp(1.0 / rate_max) * HOUR_MS;
        if t >= end_ms as f64 {
            break;
        }
        let hour = (t / HOUR_MS).rem_euclid(24.0);
        let angle = TAU * hour / 24.0;
        let rate = base_rate_per_hour * (amplitude * (angle - peak_angle).cos()).exp();
        if rng.next_f64() < rate / rate_max {
            out.push(t as i64);
        }
    }
    out
}

/// For each source time, one spawned time at `Exp(mean_lag_hours)` later.
pub fn spawned_times_ms(
    rng: &mut XorShift64,
    source_times_ms: &[i64],
    mean_lag_hours: f64,
) -> Vec<i64> {
    source_times_ms
        .iter()
        .map(|&t| t + (rng.next_exp(mean_lag_hours) * HOUR_MS) as i64)
        .collect()
}

/// Wrap raw times into named events.
pub fn events_named(name: &str, times_ms: &[i64]) -> Vec<Event> {
    times_ms
        .iter()
        .map(|&t| Event {
            time_ms: t,
            type_name: name.to_string(),
        })
        .collect()
}
