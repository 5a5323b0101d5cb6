//! Typed event input and the canonical analysis stream.
//!
//! Raw events arrive unordered from the host. The stream builder drops
//! everything outside the observation windows, sorts canonically by
//! `(time, type name)`, and interns type names into dense indices so the
//! likelihood pass can work on parallel arrays.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::windows::ObservationWindow;

/// A single life event as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Absolute UTC time in milliseconds.
    #[serde(alias = "timeMs")]
    pub time_ms: i64,
    /// Event type name. Must be non-empty to be usable.
    #[serde(alias = "typeName", alias = "type")]
    pub type_name: String,
}

/// Sorted, typed, window-restricted event stream.
///
/// `times_ms` is non-decreasing and `type_idx[i] < type_names.len()` for all
/// `i`. The interning order follows first appearance in the canonical sort,
/// so any permutation of the same input events produces an identical stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStream {
    /// Event times in milliseconds, non-decreasing.
    pub times_ms: Vec<i64>,
    /// Per-event index into `type_names`.
    pub type_idx: Vec<usize>,
    /// Interned type names.
    pub type_names: Vec<String>,
    /// Per-type event counts, parallel to `type_names`.
    pub type_counts: Vec<usize>,
}

impl EventStream {
    /// Build the canonical stream from raw events and observation windows.
    ///
    /// Drops events with empty type names and events outside every window.
    pub fn build(events: &[Event], windows: &[ObservationWindow]) -> Self {
        let mut kept: Vec<&Event> = events
            .iter()
            .filter(|e| !e.type_name.is_empty() && window_contains(windows, e.time_ms))
            .collect();
        kept.sort_by(|a, b| {
            a.time_ms
                .cmp(&b.time_ms)
                .then_with(|| a.type_name.cmp(&b.type_name))
        });

        let mut stream = EventStream::default();
        let mut name_to_idx: HashMap<&str, usize> = HashMap::new();
        for e in kept {
            let idx = match name_to_idx.get(e.type_name.as_str()) {
                Some(&idx) => idx,
                None => {
                    let idx = stream.type_names.len();
                    name_to_idx.insert(e.type_name.as_str(), idx);
                    stream.type_names.push(e.type_name.clone());
                    stream.type_counts.push(0);
                    idx
                }
            };
            stream.times_ms.push(e.time_ms);
            stream.type_idx.push(idx);
            stream.type_counts[idx] += 1;
        }
        stream
    }

    /// Number of events in the stream.
    pub fn len(&self) -> usize {
        self.times_ms.len()
    }

    /// True when the stream holds no events.
    pub fn is_empty(&self) -> bool {
        self.times_ms.is_empty()
    }

    /// Number of distinct event types.
    pub fn num_types(&self) -> usize {
        self.type_names.len()
    }
}

/// Binary search for a window containing `time_ms` (half-open intervals).
fn window_contains(windows: &[ObservationWindow], time_ms: i64) -> bool {
    let mut lo = 0usize;
    let mut hi = windows.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        let w = &windows[mid];
        if time_ms < w.start_ms {
            hi = mid;
        } else if time_ms >= w.end_ms {
            lo = mid + 1;
        } else {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(time_ms: i64, name: &str) -> Event {
        Event {
            time_ms,
            type_name: name.to_string(),
        }
    }

    fn one_window() -> Vec<ObservationWindow> {
        vec![ObservationWindow {
            start_ms: 0,
            end_ms: 1_000_000,
        }]
    }

    #[test]
    fn sorts_and_interns() {
        let events = vec![ev(500, "b"), ev(100, "a"), ev(300, "b"), ev(100, "a")];
        let stream = EventStream::build(&events, &one_window());

        assert_eq!(stream.times_ms, vec![100, 100, 300, 500]);
        assert_eq!(stream.type_names, vec!["a", "b"]);
        assert_eq!(stream.type_idx, vec![0, 0, 1, 1]);
        assert_eq!(stream.type_counts, vec![2, 2]);
    }

    #[test]
    fn drops_out_of_window_and_unnamed() {
        let events = vec![
            ev(-5, "a"),
            ev(50, "a"),
            ev(1_000_000, "a"), // end is exclusive
            ev(60, ""),
        ];
        let stream = EventStream::build(&events, &one_window());
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.times_ms, vec![50]);
    }

    #[test]
    fn permutation_of_input_gives_identical_stream() {
        let events = vec![
            ev(10, "wake"),
            ev(10, "coffee"),
            ev(5, "sleep"),
            ev(20, "coffee"),
        ];
        let mut reversed = events.clone();
        reversed.reverse();

        let a = EventStream::build(&events, &one_window());
        let b = EventStream::build(&reversed, &one_window());
        assert_eq!(a, b);
        // Canonical tie-break at t=10 is by name.
        assert_eq!(a.type_names, vec!["sleep", "coffee", "wake"]);
    }

    #[test]
    fn window_lookup_covers_multiple_windows() {
        let windows = vec![
            ObservationWindow {
                start_ms: 0,
                end_ms: 100,
            },
            ObservationWindow {
                start_ms: 200,
                end_ms: 300,
            },
        ];
        let events = vec![ev(50, "a"), ev(150, "a"), ev(250, "a"), ev(299, "a")];
        let stream = EventStream::build(&events, &windows);
        assert_eq!(stream.times_ms, vec![50, 250, 299]);
    }

    #[test]
    fn empty_windows_drop_everything() {
        let stream = EventStream::build(&[ev(1, "a")], &[]);
        assert!(stream.is_empty());
        assert_eq!(stream.num_types(), 0);
    }
}
