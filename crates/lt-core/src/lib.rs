//! life_trace analysis engine.
//!
//! Batch analyzer for streams of timestamped, typed life events. Fits a
//! multivariate self-exciting point-process GLM (exponential basis kernels,
//! circadian/weekly baselines) by regularized maximum likelihood, validates
//! it with time-rescaling KS diagnostics, and summarizes the result into a
//! directed influence graph plus rhythm summaries.
//!
//! The typical entry point is [`pipeline::analyze`] or, with progress and
//! cancellation, [`pipeline::Pipeline::run`]. The binary entry point is in
//! `main.rs`.

pub mod config;
pub mod coverage;
pub mod diagnostics;
pub mod insights;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod result;
pub mod stream;
pub mod summary;
pub mod test_utils;
pub mod windows;

pub use config::AnalysisOptions;
pub use pipeline::{analyze, Pipeline};
pub use progress::{CancelToken, ProgressSink, ProgressUpdate, Stage};
pub use result::AnalysisResult;
pub use stream::Event;
