//! Tracking-coverage segmentation.
//!
//! Splits the observed calendar into active tracking periods and dormant
//! gaps so that the model is not penalized for silence during periods when
//! the user was simply not recording events.
//!
//! # Algorithm
//!
//! 1. Bucket events into UTC days and build a dense per-day count array.
//! 2. For each day, compute a rolling-median activity baseline over the
//!    surrounding 61 days.
//! 3. A day is active iff `count >= max(2, 0.1 * baseline)`.
//! 4. Runs of equal state become periods; an inactive run shorter than
//!    [`MIN_GAP_DAYS`] is folded into its neighbors, and merge passes repeat
//!    until adjacent periods always alternate the gap flag.

use serde::{Deserialize, Serialize};

use crate::stream::Event;

/// Milliseconds per UTC day.
pub const DAY_MS: i64 = 86_400_000;

/// Half-width of the rolling-median window, in days.
const MEDIAN_HALF_WINDOW: i64 = 30;

/// Minimum length of an inactive run before it counts as a tracking gap.
pub const MIN_GAP_DAYS: i64 = 14;

/// UTC day index of a millisecond timestamp (days since the epoch).
pub fn day_index(time_ms: i64) -> i64 {
    time_ms.div_euclid(DAY_MS)
}

/// One contiguous stretch of days, either actively tracked or a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPeriod {
    /// First day of the period (UTC day index).
    pub start_day: i64,
    /// Last day of the period, inclusive.
    pub end_day: i64,
    /// Millisecond timestamp of the period start (midnight UTC).
    pub start_ms: i64,
    /// Millisecond timestamp just past the period end (exclusive).
    pub end_ms: i64,
    /// Number of calendar days covered.
    pub day_count: i64,
    /// Number of events recorded inside the period.
    pub event_count: usize,
    /// Whether this period is a tracking gap.
    pub is_gap: bool,
}

impl TrackingPeriod {
    fn from_run(start_day: i64, end_day: i64, is_gap: bool, counts: &[usize], first_day: i64) -> Self {
        let event_count = (start_day..=end_day)
            .map(|d| counts[(d - first_day) as usize])
            .sum();
        TrackingPeriod {
            start_day,
            end_day,
            start_ms: start_day * DAY_MS,
            end_ms: (end_day + 1) * DAY_MS,
            day_count: end_day - start_day + 1,
            event_count,
            is_gap,
        }
    }
}

/// Coverage segmentation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    /// Total calendar days between the first and last event, inclusive.
    pub total_days: i64,
    /// Days inside active periods.
    pub active_days: i64,
    /// Days inside gap periods.
    pub gap_days: i64,
    /// Active days as a percentage of total days.
    pub coverage_percent: f64,
    /// Alternating active/gap periods in chronological order.
    pub periods: Vec<TrackingPeriod>,
}

/// Segment the event timeline into active and gap periods.
pub fn analyze_coverage(events: &[Event]) -> CoverageSummary {
    if events.is_empty() {
        return CoverageSummary::default();
    }

    let mut first_day = i64::MAX;
    let mut last_day = i64::MIN;
    for e in events {
        let d = day_index(e.time_ms);
        first_day = first_day.min(d);
        last_day = last_day.max(d);
    }

    let total_days = last_day - first_day + 1;
    let mut counts = vec![0usize; total_days as usize];
    for e in events {
        counts[(day_index(e.time_ms) - first_day) as usize] += 1;
    }

    // Rolling-median baseline and the per-day activity flag.
    let mut active = vec![false; counts.len()];
    let mut window: Vec<usize> = Vec::with_capacity((2 * MEDIAN_HALF_WINDOW + 1) as usize);
    for i in 0..counts.len() as i64 {
        let lo = (i - MEDIAN_HALF_WINDOW).max(0) as usize;
        let hi = ((i + MEDIAN_HALF_WINDOW) as usize).min(counts.len() - 1);
        window.clear();
        window.extend_from_slice(&counts[lo..=hi]);
        window.sort_unstable();
        let baseline = median_of_sorted(&window);
        let threshold = (0.1 * baseline).max(2.0);
        active[i as usize] = counts[i as usize] as f64 >= threshold;
    }

    // Runs of equal state; short inactive runs stay attached to tracking.
    let mut periods: Vec<TrackingPeriod> = Vec::new();
    let mut run_start = 0usize;
    for i in 1..=active.len() {
        if i == active.len() || active[i] != active[run_start] {
            let start_day = first_day + run_start as i64;
            let end_day = first_day + i as i64 - 1;
            let run_len = end_day - start_day + 1;
            let is_gap = !active[run_start] && run_len >= MIN_GAP_DAYS;
            periods.push(TrackingPeriod::from_run(
                start_day, end_day, is_gap, &counts, first_day,
            ));
            run_start = i;
        }
    }

    // Merge neighbors sharing a flag until the sequence alternates.
    loop {
        let mut merged = false;
        let mut out: Vec<TrackingPeriod> = Vec::with_capacity(periods.len());
        for p in periods.into_iter() {
            match out.last_mut() {
                Some(prev) if prev.is_gap == p.is_gap => {
                    let is_gap = prev.is_gap;
                    *prev = TrackingPeriod::from_run(
                        prev.start_day,
                        p.end_day,
                        is_gap,
                        &counts,
                        first_day,
                    );
                    merged = true;
                }
                _ => out.push(p),
            }
        }
        periods = out;
        if !merged {
            break;
        }
    }

    let active_days: i64 = periods.iter().filter(|p| !p.is_gap).map(|p| p.day_count).sum();
    let gap_days = total_days - active_days;
    let coverage_percent = if total_days > 0 {
        100.0 * active_days as f64 / total_days as f64
    } else {
        0.0
    };

    CoverageSummary {
        total_days,
        active_days,
        gap_days,
        coverage_percent,
        periods,
    }
}

fn median_of_sorted(sorted: &[usize]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(time_ms: i64) -> Event {
        Event {
            time_ms,
            type_name: "a".to_string(),
        }
    }

    fn daily_events(start_day: i64, days: i64, per_day: usize) -> Vec<Event> {
        let mut out = Vec::new();
        for d in start_day..start_day + days {
            for k in 0..per_day {
                out.push(ev(d * DAY_MS + (k as i64 + 1) * 3_600_000));
            }
        }
        out
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let summary = analyze_coverage(&[]);
        assert_eq!(summary, CoverageSummary::default());
    }

    #[test]
    fn steady_tracking_is_one_active_period() {
        let events = daily_events(100, 60, 5);
        let summary = analyze_coverage(&events);
        assert_eq!(summary.total_days, 60);
        assert_eq!(summary.periods.len(), 1);
        assert!(!summary.periods[0].is_gap);
        assert_eq!(summary.active_days, 60);
        assert_eq!(summary.gap_days, 0);
        assert!((summary.coverage_percent - 100.0).abs() < 1e-12);
    }

    #[test]
    fn long_silence_becomes_a_gap() {
        let mut events = daily_events(0, 30, 5);
        events.extend(daily_events(90, 30, 5)); // 60 silent days in between
        let summary = analyze_coverage(&events);

        assert_eq!(summary.total_days, 120);
        assert_eq!(summary.periods.len(), 3);
        assert!(!summary.periods[0].is_gap);
        assert!(summary.periods[1].is_gap);
        assert!(!summary.periods[2].is_gap);
        assert_eq!(summary.periods[1].event_count, 0);
        assert_eq!(summary.active_days + summary.gap_days, summary.total_days);
    }

    #[test]
    fn short_silence_is_absorbed() {
        let mut events = daily_events(0, 20, 5);
        events.extend(daily_events(25, 20, 5)); // 5 silent days, below the gap floor
        let summary = analyze_coverage(&events);

        assert_eq!(summary.periods.len(), 1);
        assert!(!summary.periods[0].is_gap);
        assert_eq!(summary.gap_days, 0);
    }

    #[test]
    fn period_day_counts_partition_the_timeline() {
        let mut events = daily_events(10, 40, 3);
        events.extend(daily_events(80, 25, 3));
        let summary = analyze_coverage(&events);

        let sum: i64 = summary.periods.iter().map(|p| p.day_count).sum();
        assert_eq!(sum, summary.total_days);
        for pair in summary.periods.windows(2) {
            assert_ne!(pair[0].is_gap, pair[1].is_gap);
            assert_eq!(pair[0].end_day + 1, pair[1].start_day);
        }
    }

    #[test]
    fn negative_timestamps_bucket_correctly() {
        // Events before the epoch land on negative day indices.
        assert_eq!(day_index(-1), -1);
        assert_eq!(day_index(-DAY_MS), -1);
        assert_eq!(day_index(-DAY_MS - 1), -2);
        assert_eq!(day_index(0), 0);

        let events = vec![ev(-DAY_MS + 5), ev(-DAY_MS + 6), ev(5), ev(6)];
        let summary = analyze_coverage(&events);
        assert_eq!(summary.total_days, 2);
    }
}
