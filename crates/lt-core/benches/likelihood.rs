//! Benchmark of the single-pass likelihood/gradient evaluation.

use criterion::{criterion_group, criterion_main, Criterion};

use lt_core::config::AnalysisOptions;
use lt_core::model::fit::fit_all;
use lt_core::model::likelihood::{target_log_likelihood, QUAD_POINTS_FIT};
use lt_core::model::params::ModelParams;
use lt_core::stream::EventStream;
use lt_core::test_utils::{events_named, poisson_times_ms, XorShift64};
use lt_core::windows::ObservationWindow;

const HOUR_MS: i64 = 3_600_000;

fn synthetic_stream(span_hours: i64) -> (EventStream, Vec<ObservationWindow>) {
    let windows = vec![ObservationWindow {
        start_ms: 0,
        end_ms: span_hours * HOUR_MS,
    }];
    let mut rng = XorShift64::new(17);
    let a = poisson_times_ms(&mut rng, 0.5, 0, span_hours * HOUR_MS);
    let b = poisson_times_ms(&mut rng, 0.5, 0, span_hours * HOUR_MS);
    let mut events = events_named("a", &a);
    events.extend(events_named("b", &b));
    (EventStream::build(&events, &windows), windows)
}

fn bench_likelihood(c: &mut Criterion) {
    let (stream, windows) = synthetic_stream(1000);
    let params = ModelParams::init_from_data(&stream, 1000.0, 6);

    c.bench_function("likelihood/one_pass_1kh", |b| {
        b.iter(|| target_log_likelihood(&stream, &windows, &params, 0, 0.01, 0.001, QUAD_POINTS_FIT))
    });
}

fn bench_fit(c: &mut Criterion) {
    let (stream, windows) = synthetic_stream(500);
    let options = AnalysisOptions {
        max_iter: 10,
        ..Default::default()
    };

    c.bench_function("fit/two_targets_10_iters", |b| {
        b.iter(|| fit_all(&stream, &windows, &options, |_, _, _| true).expect("fit"))
    });
}

criterion_group!(benches, bench_likelihood, bench_fit);
criterion_main!(benches);
