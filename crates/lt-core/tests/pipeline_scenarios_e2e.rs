//! End-to-end pipeline scenarios over synthetic event histories.

use lt_core::config::AnalysisOptions;
use lt_core::insights::InsightKind;
use lt_core::pipeline::analyze;
use lt_core::stream::Event;
use lt_core::summary::EdgeDirection;
use lt_core::test_utils::{
    diurnal_times_ms, events_named, poisson_times_ms, spawned_times_ms, XorShift64,
};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// 2024-01-01T00:00:00Z.
const BASE_MS: i64 = 1_704_067_200_000;

#[test]
fn empty_input_yields_zeroed_result() {
    let result = analyze(&[], AnalysisOptions::default()).expect("analyze");

    assert_eq!(result.coverage.total_days, 0);
    assert_eq!(result.coverage.periods.len(), 0);
    assert!(!result.model_fitted);
    assert_eq!(result.num_events, 0);
    assert_eq!(result.num_types, 0);
    assert!(result.edges.is_empty());
    assert!(result.baselines.is_empty());
    assert!(result.diagnostics.is_empty());
    assert!(result.insights.is_empty());
}

#[test]
fn single_type_never_fits() {
    let mut rng = XorShift64::new(1);
    let times = poisson_times_ms(&mut rng, 1.0, BASE_MS, BASE_MS + 200 * HOUR_MS);
    let events = events_named("A", &times[..100.min(times.len())]);

    let result = analyze(&events, AnalysisOptions::default()).expect("analyze");
    assert!(!result.model_fitted);
    assert_eq!(result.num_types, 1);
    assert!(result.edges.is_empty());
}

#[test]
fn independent_poisson_pair_shows_no_strong_structure() {
    let mut rng = XorShift64::new(33);
    let span = 1000 * HOUR_MS;
    let a = poisson_times_ms(&mut rng, 0.5, BASE_MS, BASE_MS + span);
    let b = poisson_times_ms(&mut rng, 0.5, BASE_MS, BASE_MS + span);
    let mut events = events_named("A", &a);
    events.extend(events_named("B", &b));

    let result = analyze(&events, AnalysisOptions::default()).expect("analyze");
    assert!(result.model_fitted);
    assert_eq!(result.num_types, 2);

    for baseline in &result.baselines {
        assert!(
            baseline.hour_amp < 0.3,
            "{}: hour_amp {}",
            baseline.type_name,
            baseline.hour_amp
        );
    }
    for edge in &result.edges {
        assert!(edge.strength < 0.7, "{} -> {}: {}", edge.source, edge.target, edge.strength);
        assert!(edge.integrated_effect.abs() < 1.0);
        assert!(edge.hr_at_peak.is_finite() && edge.hr_at_peak > 0.0);
    }
}

#[test]
fn excitation_cascade_is_detected_directionally() {
    let mut rng = XorShift64::new(7);
    let span = 1000 * HOUR_MS;
    let a = poisson_times_ms(&mut rng, 0.6, BASE_MS, BASE_MS + span);
    let b = spawned_times_ms(&mut rng, &a, 1.0);
    let mut events = events_named("A", &a);
    events.extend(events_named("B", &b));

    let options = AnalysisOptions {
        max_iter: 200,
        ..Default::default()
    };
    let result = analyze(&events, options).expect("analyze");
    assert!(result.model_fitted);

    let forward = result
        .edges
        .iter()
        .find(|e| e.source == "A" && e.target == "B")
        .expect("A -> B edge must be reported");
    assert_eq!(forward.direction, EdgeDirection::Excite);
    assert!(forward.integrated_effect > 0.1);
    assert!(
        forward.hr_at_1h > 1.2,
        "hr_at_1h = {}",
        forward.hr_at_1h
    );
    assert!(
        forward.mass_time_ms > 5.0 * 60_000.0 && forward.mass_time_ms < 6.0 * 3_600_000.0,
        "mass_time_ms = {}",
        forward.mass_time_ms
    );

    // The reverse direction carries no comparable signal.
    if let Some(reverse) = result
        .edges
        .iter()
        .find(|e| e.source == "B" && e.target == "A")
    {
        assert!(reverse.strength < forward.strength);
        assert!(reverse.integrated_effect < forward.integrated_effect);
        assert!(reverse.integrated_effect.abs() < 0.5);
    }

    // The strong forward edge surfaces as an insight.
    assert!(result
        .insights
        .iter()
        .any(|i| i.text.contains("A") && i.text.contains("B")));
}

#[test]
fn diurnal_rhythm_is_recovered_and_calibrated() {
    let mut rng = XorShift64::new(11);
    let span = 1250 * HOUR_MS;
    let c = diurnal_times_ms(&mut rng, 0.5, 0.8, 8.0, BASE_MS, BASE_MS + span);
    let d = poisson_times_ms(&mut rng, 0.2, BASE_MS, BASE_MS + span);
    let mut events = events_named("C", &c);
    events.extend(events_named("D", &d));

    let options = AnalysisOptions {
        max_iter: 300,
        ..Default::default()
    };
    let result = analyze(&events, options).expect("analyze");
    assert!(result.model_fitted);

    let baseline = result
        .baselines
        .iter()
        .find(|b| b.type_name == "C")
        .expect("baseline for C");
    assert!(baseline.hour_amp > 0.5, "hour_amp = {}", baseline.hour_amp);
    assert!(
        baseline.hour_peak > 7.0 && baseline.hour_peak < 9.0,
        "hour_peak = {}",
        baseline.hour_peak
    );

    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.type_name == "C")
        .expect("diagnostic for C");
    assert!(
        diag.ks_passes_at_05,
        "ks = {} over {} events",
        diag.ks_statistic,
        result.num_events
    );

    // A rhythm insight surfaces for the periodic type.
    assert!(result
        .insights
        .iter()
        .any(|i| i.kind == InsightKind::Rhythm && i.text.contains("C")));
}

#[test]
fn long_dormant_stretch_becomes_a_coverage_gap() {
    // Twenty active days in January and twenty in June, nothing between.
    let mut events: Vec<Event> = Vec::new();
    for cluster_start in [BASE_MS, BASE_MS + 152 * DAY_MS] {
        for day in 0..20i64 {
            for slot in 0..10i64 {
                let t = cluster_start + day * DAY_MS + slot * (DAY_MS / 10) + 17;
                let name = if slot % 2 == 0 { "A" } else { "B" };
                events.push(Event {
                    time_ms: t,
                    type_name: name.to_string(),
                });
            }
        }
    }

    let result = analyze(&events, AnalysisOptions::default()).expect("analyze");

    assert_eq!(result.coverage.total_days, 172);
    assert_eq!(result.coverage.periods.len(), 3);
    assert!(!result.coverage.periods[0].is_gap);
    assert!(result.coverage.periods[1].is_gap);
    assert!(!result.coverage.periods[2].is_gap);
    assert!(result.coverage.periods[1].day_count >= 14);
    assert_eq!(result.coverage.periods[1].event_count, 0);
    assert_eq!(
        result.coverage.active_days + result.coverage.gap_days,
        result.coverage.total_days
    );

    // Observation time excludes the dormant stretch entirely.
    assert!((result.total_observed_hours - 2.0 * 20.0 * 24.0).abs() < 1e-9);
    assert_eq!(result.num_events, 400);
}

#[test]
fn results_serialize_and_round_trip() {
    let mut rng = XorShift64::new(13);
    let span = 600 * HOUR_MS;
    let a = poisson_times_ms(&mut rng, 0.5, BASE_MS, BASE_MS + span);
    let b = spawned_times_ms(&mut rng, &a, 0.5);
    let mut events = events_named("A", &a);
    events.extend(events_named("B", &b));

    let result = analyze(&events, AnalysisOptions::default()).expect("analyze");
    let json = serde_json::to_string(&result).expect("serialize");
    let back: lt_core::result::AnalysisResult = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(result, back);

    // External field naming contract.
    assert!(json.contains("\"modelFitted\""));
    assert!(json.contains("\"totalObservedHours\""));
    assert!(json.contains("\"coveragePercent\""));
}
