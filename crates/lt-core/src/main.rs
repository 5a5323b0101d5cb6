//! `lt` command-line entry point.
//!
//! Reads a JSON array of `{"type": ..., "timeMs": ...}` events, runs the
//! analysis pipeline, streams progress to stderr, and prints the result JSON
//! to stdout. Errors print as structured JSON on stderr with a stable exit
//! code.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use lt_common::{Error, StructuredError};
use lt_core::config::AnalysisOptions;
use lt_core::logging::{init_logging, LogConfig};
use lt_core::pipeline::Pipeline;
use lt_core::progress::{CancelToken, ProgressSink, ProgressUpdate};
use lt_core::stream::Event;

/// Process exit codes.
const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_BAD_INPUT: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "lt",
    version,
    about = "life_trace: influence and rhythm analysis over typed life events"
)]
struct Cli {
    /// Log filter directive, e.g. "debug" or "lt_core=trace".
    #[arg(long, global = true)]
    log_filter: Option<String>,

    /// Emit stderr logs and progress as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze an event file and print the result JSON to stdout.
    Analyze {
        /// Path to a JSON array of events.
        #[arg(long, short)]
        input: PathBuf,

        /// Number of exponential basis kernels.
        #[arg(long)]
        bases: Option<usize>,

        /// Maximum Adam iterations per target type.
        #[arg(long)]
        max_iter: Option<usize>,

        /// Adam learning rate.
        #[arg(long)]
        learning_rate: Option<f64>,

        /// L1 penalty on influence weights.
        #[arg(long)]
        lambda1: Option<f64>,

        /// L2 penalty on influence weights.
        #[arg(long)]
        lambda2: Option<f64>,

        /// Minimum total absolute weight for a reported edge.
        #[arg(long)]
        min_strength: Option<f64>,

        /// Maximum number of derived insights.
        #[arg(long)]
        max_insights: Option<usize>,

        /// Suppress progress lines on stderr.
        #[arg(long)]
        quiet: bool,

        /// Pretty-print the result JSON.
        #[arg(long)]
        pretty: bool,
    },
}

/// Prints progress updates to stderr as they arrive.
struct StderrProgress {
    jsonl: bool,
}

impl ProgressSink for StderrProgress {
    fn emit(&mut self, update: ProgressUpdate) {
        if self.jsonl {
            if let Ok(line) = serde_json::to_string(&update) {
                eprintln!("{line}");
            }
        } else {
            match &update.detail {
                Some(detail) => eprintln!("[{:>3.0}%] {} ({detail})", update.percent, update.stage),
                None => eprintln!("[{:>3.0}%] {}", update.percent, update.stage),
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_flag = if cli.log_json { Some(true) } else { None };
    let log_config = LogConfig::from_env(cli.log_filter.clone(), json_flag);
    init_logging(&log_config);

    match cli.command {
        Command::Analyze {
            input,
            bases,
            max_iter,
            learning_rate,
            lambda1,
            lambda2,
            min_strength,
            max_insights,
            quiet,
            pretty,
        } => {
            let defaults = AnalysisOptions::default();
            let options = AnalysisOptions {
                num_bases: bases.unwrap_or(defaults.num_bases),
                max_iter: max_iter.unwrap_or(defaults.max_iter),
                learning_rate: learning_rate.unwrap_or(defaults.learning_rate),
                lambda1: lambda1.unwrap_or(defaults.lambda1),
                lambda2: lambda2.unwrap_or(defaults.lambda2),
                min_strength: min_strength.unwrap_or(defaults.min_strength),
                max_insights: max_insights.unwrap_or(defaults.max_insights),
            };
            match run_analyze(&input, options, quiet, log_config.json, pretty) {
                Ok(()) => ExitCode::from(EXIT_OK),
                Err(err) => {
                    eprintln!("{}", StructuredError::from(&err).to_json());
                    match err {
                        Error::InvalidOptions(_) | Error::InvalidEvents(_) | Error::Io(_) => {
                            ExitCode::from(EXIT_BAD_INPUT)
                        }
                        Error::Cancelled => ExitCode::from(EXIT_CANCELLED),
                        _ => ExitCode::from(EXIT_FAILURE),
                    }
                }
            }
        }
    }
}

fn run_analyze(
    input: &PathBuf,
    options: AnalysisOptions,
    quiet: bool,
    jsonl: bool,
    pretty: bool,
) -> lt_common::Result<()> {
    let payload = std::fs::read_to_string(input)?;
    let events: Vec<Event> = serde_json::from_str(&payload)
        .map_err(|e| Error::InvalidEvents(format!("{}: {e}", input.display())))?;
    tracing::info!(events = events.len(), input = %input.display(), "loaded events");

    let mut null_sink = lt_core::progress::NullSink;
    let mut stderr_sink = StderrProgress { jsonl };
    let sink: &mut dyn ProgressSink = if quiet { &mut null_sink } else { &mut stderr_sink };

    let result = Pipeline::new(options).run(&events, sink, &CancelToken::new())?;

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}
