//! Serializable analysis result.

use serde::{Deserialize, Serialize};

use crate::coverage::CoverageSummary;
use crate::diagnostics::DiagnosticResult;
use crate::insights::Insight;
use crate::summary::{BaselineSummary, InfluenceEdge};

/// Final output of one analysis run.
///
/// Fully value-typed and serde-round-trippable; hosts keep copies and the
/// pipeline retains nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub coverage: CoverageSummary,
    pub total_observed_hours: f64,
    pub num_events: usize,
    pub num_types: usize,
    /// False when the input did not support fitting; the rest of the
    /// structure is still well-formed (empty lists).
    pub model_fitted: bool,
    pub edges: Vec<InfluenceEdge>,
    pub baselines: Vec<BaselineSummary>,
    pub diagnostics: Vec<DiagnosticResult>,
    pub insights: Vec<Insight>,
}

impl AnalysisResult {
    /// Well-formed result for inputs that cannot support a model fit.
    pub fn insufficient(
        coverage: CoverageSummary,
        total_observed_hours: f64,
        num_events: usize,
        num_types: usize,
    ) -> Self {
        AnalysisResult {
            coverage,
            total_observed_hours,
            num_events,
            num_types,
            model_fitted: false,
            edges: Vec::new(),
            baselines: Vec::new(),
            diagnostics: Vec::new(),
            insights: Vec::new(),
        }
    }
}
