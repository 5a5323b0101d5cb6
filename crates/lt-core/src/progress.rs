//! Progress emission and cooperative cancellation.
//!
//! The pipeline reports stage transitions through a [`ProgressSink`] and
//! checks a shared [`CancelToken`] at its yield points. Updates are delivered
//! in production order: zero or more progress messages, then exactly one
//! terminal result or error from the caller's side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stage for a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Coverage,
    Stream,
    Fit,
    Summarize,
    Diagnose,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Coverage => write!(f, "coverage"),
            Stage::Stream => write!(f, "stream"),
            Stage::Fit => write!(f, "fit"),
            Stage::Summarize => write!(f, "summarize"),
            Stage::Diagnose => write!(f, "diagnose"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// One structured progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub stage: Stage,
    /// Completion percentage in `[0, 100]`.
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressUpdate {
    pub fn new(stage: Stage, percent: f64) -> Self {
        ProgressUpdate {
            stage,
            percent,
            detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Receiver of pipeline progress updates.
pub trait ProgressSink {
    fn emit(&mut self, update: ProgressUpdate);
}

/// Discards every update.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _update: ProgressUpdate) {}
}

/// Buffers updates in memory; useful for tests and batch hosts.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub updates: Vec<ProgressUpdate>,
}

impl ProgressSink for CollectingSink {
    fn emit(&mut self, update: ProgressUpdate) {
        self.updates.push(update);
    }
}

/// Forwards updates over an mpsc channel to another thread.
///
/// Send failures are ignored: a host that dropped its receiver has already
/// stopped listening.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<ProgressUpdate>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::channel();
        (ChannelSink { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&mut self, update: ProgressUpdate) {
        let _ = self.tx.send(update);
    }
}

/// Shared cancellation flag checked at the pipeline's yield points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The analysis stops at its next yield point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
