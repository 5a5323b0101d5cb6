//! Recursive history state.
//!
//! For each source type `s` and basis `b`, `S[s][b]` holds the decayed sum
//! of unit impulses from past events of type `s` under kernel `tau_b`:
//!
//! ```text
//! S[s][b](t) = sum_{events e of type s, t_e <= t} exp(-(t - t_e)/tau_b)
//! ```
//!
//! Maintained recursively: advancing time multiplies each component by the
//! kernel decay over the elapsed interval, and an event adds a unit impulse
//! to every basis component of its source type.

use crate::model::basis::{decay, TIMESCALES_HOURS};

/// Per-source decayed impulse sums, local to one likelihood pass.
#[derive(Debug, Clone)]
pub struct RecursiveState {
    /// `s[source][basis]`, each component non-negative.
    s: Vec<Vec<f64>>,
    /// Clock of the last advance, in fractional hours. NaN until first use.
    last_time_hours: f64,
    num_bases: usize,
}

impl RecursiveState {
    /// Fresh state with all sums zero and an unset clock.
    pub fn new(num_types: usize, num_bases: usize) -> Self {
        RecursiveState {
            s: vec![vec![0.0; num_bases]; num_types],
            last_time_hours: f64::NAN,
            num_bases,
        }
    }

    /// Decayed impulse sums for one source type.
    pub fn source(&self, type_idx: usize) -> &[f64] {
        &self.s[type_idx]
    }

    /// Clock of the last advance, in hours.
    pub fn last_time_hours(&self) -> f64 {
        self.last_time_hours
    }

    /// Advance the clock to `t_hours`, decaying every component.
    ///
    /// A non-finite clock (fresh state) is set without decay. Going
    /// backwards is a no-op on the sums; the clock never retreats.
    pub fn advance(&mut self, t_hours: f64) {
        if !self.last_time_hours.is_finite() {
            self.last_time_hours = t_hours;
            return;
        }
        let dt = t_hours - self.last_time_hours;
        if dt <= 0.0 {
            return;
        }
        for b in 0..self.num_bases {
            let factor = decay(dt, TIMESCALES_HOURS[b]);
            for row in self.s.iter_mut() {
                row[b] *= factor;
            }
        }
        self.last_time_hours = t_hours;
    }

    /// Register an event of the given source type: +1 on every basis.
    ///
    /// Each basis shares the same per-event impulse; only the decay
    /// timescale differs.
    pub fn add_event(&mut self, type_idx: usize) {
        for v in self.s[type_idx].iter_mut() {
            *v += 1.0;
        }
    }
}
