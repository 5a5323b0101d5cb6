//! Analysis options and semantic validation.
//!
//! Options are syntactically trivial (a flat struct), so validation focuses
//! on semantic constraints: positive rates, sane iteration counts, and a
//! basis count the kernel family actually supports.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::basis::MAX_BASES;

/// Errors produced by semantic validation of [`AnalysisOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("num_bases must be in [1, {max}] (got {value})", max = MAX_BASES)]
    NumBasesRange { value: usize },

    #[error("max_iter must be in [1, 10000] (got {value})")]
    MaxIterRange { value: usize },

    #[error("learning_rate must be positive and finite (got {value})")]
    LearningRateRange { value: f64 },

    #[error("lambda1 must be non-negative and finite (got {value})")]
    Lambda1Range { value: f64 },

    #[error("lambda2 must be non-negative and finite (got {value})")]
    Lambda2Range { value: f64 },

    #[error("min_strength must be non-negative and finite (got {value})")]
    MinStrengthRange { value: f64 },
}

/// Tunable options for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Number of exponential basis kernels used by the influence model.
    pub num_bases: usize,
    /// Maximum Adam iterations per target type.
    pub max_iter: usize,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// L1 penalty on influence coefficients.
    pub lambda1: f64,
    /// L2 penalty on influence coefficients.
    pub lambda2: f64,
    /// Minimum total absolute weight for an edge to be reported.
    pub min_strength: f64,
    /// Maximum number of derived insights in the result.
    pub max_insights: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            num_bases: 6, // timescales up to one day
            max_iter: 150,
            learning_rate: 0.01,
            lambda1: 0.01,
            lambda2: 0.001,
            min_strength: 0.1,
            max_insights: 20,
        }
    }
}

impl AnalysisOptions {
    /// Validate semantic constraints on the option values.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.num_bases == 0 || self.num_bases > MAX_BASES {
            return Err(OptionsError::NumBasesRange {
                value: self.num_bases,
            });
        }
        if self.max_iter == 0 || self.max_iter > 10_000 {
            return Err(OptionsError::MaxIterRange {
                value: self.max_iter,
            });
        }
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(OptionsError::LearningRateRange {
                value: self.learning_rate,
            });
        }
        if !(self.lambda1 >= 0.0) || !self.lambda1.is_finite() {
            return Err(OptionsError::Lambda1Range {
                value: self.lambda1,
            });
        }
        if !(self.lambda2 >= 0.0) || !self.lambda2.is_finite() {
            return Err(OptionsError::Lambda2Range {
                value: self.lambda2,
            });
        }
        if !(self.min_strength >= 0.0) || !self.min_strength.is_finite() {
            return Err(OptionsError::MinStrengthRange {
                value: self.min_strength,
            });
        }
        Ok(())
    }
}
