//! End-to-end analysis pipeline.
//!
//! Orchestrates coverage segmentation, stream assembly, per-target fitting,
//! summarization, and diagnostics, emitting ordered progress updates along
//! the way. The pipeline owns every intermediate artifact; callers receive a
//! value-typed [`AnalysisResult`] and nothing else survives the run.
//!
//! Stage flow and progress percents:
//!
//! ```text
//! Coverage(5) -> Stream(10) -> Fit(15 + 70*fraction) -> Summarize(90)
//!     -> Diagnose(95) -> Done(100)
//! ```
//!
//! Runs abort early (with a well-formed `model_fitted = false` result) when
//! the observation windows are empty, fewer than [`MIN_EVENTS`] usable events
//! remain, or fewer than [`MIN_TYPES`] distinct types are present.

use lt_common::{Error, Result};

use crate::config::AnalysisOptions;
use crate::coverage::analyze_coverage;
use crate::diagnostics::run_diagnostics;
use crate::insights::derive_insights;
use crate::model::basis::MS_PER_HOUR;
use crate::model::fit::fit_all;
use crate::progress::{CancelToken, NullSink, ProgressSink, ProgressUpdate, Stage};
use crate::result::AnalysisResult;
use crate::stream::{Event, EventStream};
use crate::summary::{extract_baselines, extract_edges};
use crate::windows::{total_observed_ms, windows_from_periods};

/// Minimum usable events for a model fit.
pub const MIN_EVENTS: usize = 50;

/// Minimum distinct event types for a model fit.
pub const MIN_TYPES: usize = 2;

/// Analysis pipeline configured with one set of options.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: AnalysisOptions,
}

impl Pipeline {
    pub fn new(options: AnalysisOptions) -> Self {
        Pipeline { options }
    }

    /// Run the full analysis over the supplied events.
    ///
    /// Emits progress to `sink` and honors `cancel` at every yield point.
    /// Cancellation surfaces as [`Error::Cancelled`]; the host discards any
    /// output after requesting it.
    pub fn run(
        &self,
        events: &[Event],
        sink: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult> {
        self.options
            .validate()
            .map_err(|e| Error::InvalidOptions(e.to_string()))?;

        sink.emit(ProgressUpdate::new(Stage::Coverage, 5.0));
        let coverage = analyze_coverage(events);
        tracing::debug!(
            total_days = coverage.total_days,
            active_days = coverage.active_days,
            periods = coverage.periods.len(),
            "coverage segmented"
        );
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        sink.emit(ProgressUpdate::new(Stage::Stream, 10.0));
        let windows = windows_from_periods(&coverage.periods);
        let stream = EventStream::build(events, &windows);
        let total_observed_hours = total_observed_ms(&windows) as f64 / MS_PER_HOUR;
        tracing::debug!(
            windows = windows.len(),
            events = stream.len(),
            types = stream.num_types(),
            total_observed_hours,
            "event stream assembled"
        );
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if windows.is_empty() || stream.len() < MIN_EVENTS || stream.num_types() < MIN_TYPES {
            tracing::info!(
                events = stream.len(),
                types = stream.num_types(),
                "insufficient data; skipping model fit"
            );
            sink.emit(ProgressUpdate::new(Stage::Done, 100.0));
            return Ok(AnalysisResult::insufficient(
                coverage,
                total_observed_hours,
                stream.len(),
                stream.num_types(),
            ));
        }

        sink.emit(ProgressUpdate::new(Stage::Fit, 15.0));
        let fit = fit_all(&stream, &windows, &self.options, |done, eligible, name| {
            let fraction = done as f64 / eligible.max(1) as f64;
            sink.emit(
                ProgressUpdate::new(Stage::Fit, 15.0 + 70.0 * fraction).with_detail(name),
            );
            !cancel.is_cancelled()
        })?;

        if !fit.any_fitted() {
            sink.emit(ProgressUpdate::new(Stage::Done, 100.0));
            return Ok(AnalysisResult::insufficient(
                coverage,
                total_observed_hours,
                stream.len(),
                stream.num_types(),
            ));
        }

        sink.emit(ProgressUpdate::new(Stage::Summarize, 90.0));
        let edges = extract_edges(&fit, self.options.min_strength);
        let baselines = extract_baselines(&fit);
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        sink.emit(ProgressUpdate::new(Stage::Diagnose, 95.0));
        let diagnostics = run_diagnostics(&stream, &windows, &fit);
        let insights = derive_insights(&edges, &baselines, self.options.max_insights);

        sink.emit(ProgressUpdate::new(Stage::Done, 100.0));
        tracing::info!(
            edges = edges.len(),
            baselines = baselines.len(),
            insights = insights.len(),
            "analysis complete"
        );
        Ok(AnalysisResult {
            coverage,
            total_observed_hours,
            num_events: stream.len(),
            num_types: stream.num_types(),
            model_fitted: true,
            edges,
            baselines,
            diagnostics,
            insights,
        })
    }
}

/// Convenience entry point: run with a silent sink and no cancellation.
pub fn analyze(events: &[Event], options: AnalysisOptions) -> Result<AnalysisResult> {
    Pipeline::new(options).run(events, &mut NullSink, &CancelToken::new())
}
