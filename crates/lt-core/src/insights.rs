//! Human-readable insight records derived from the fitted summaries.

use serde::{Deserialize, Serialize};

use crate::summary::{BaselineSummary, EdgeDirection, InfluenceEdge};

/// Edges with half their influence mass inside this lag read as
/// co-occurrence rather than delayed influence.
const CO_OCCURRENCE_MS: f64 = 15.0 * 60_000.0;

/// Minimum hour-of-day amplitude before a rhythm is worth reporting.
const RHYTHM_MIN_AMP: f64 = 0.3;

/// Kind of derived insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    Influence,
    Rhythm,
    CoOccurrence,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightKind::Influence => write!(f, "influence"),
            InsightKind::Rhythm => write!(f, "rhythm"),
            InsightKind::CoOccurrence => write!(f, "co-occurrence"),
        }
    }
}

/// One derived, display-ready insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
    /// Ranking score in `[0, 1)`; higher sorts first.
    pub score: f64,
}

/// Derive up to `max_insights` ranked insights from edges and baselines.
pub fn derive_insights(
    edges: &[InfluenceEdge],
    baselines: &[BaselineSummary],
    max_insights: usize,
) -> Vec<Insight> {
    let mut out = Vec::new();

    for edge in edges {
        if edge.mass_time_ms < CO_OCCURRENCE_MS {
            out.push(Insight {
                kind: InsightKind::CoOccurrence,
                text: format!(
                    "\"{}\" and \"{}\" tend to occur together within 15 minutes",
                    edge.source, edge.target
                ),
                score: edge.strength,
            });
        } else if edge.direction == EdgeDirection::Neutral {
            continue;
        } else {
            let verb = match edge.direction {
                EdgeDirection::Excite => "makes",
                EdgeDirection::Inhibit => "suppresses",
                EdgeDirection::Neutral => unreachable!(),
            };
            let lag = describe_lag_ms(edge.mass_time_ms);
            let text = match edge.direction {
                EdgeDirection::Excite => format!(
                    "\"{}\" {} \"{}\" more likely over the next {} (x{:.1} at peak)",
                    edge.source, verb, edge.target, lag, edge.hr_at_peak
                ),
                _ => format!(
                    "\"{}\" {} \"{}\" for about {} (x{:.2} at peak)",
                    edge.source, verb, edge.target, lag, edge.hr_at_peak
                ),
            };
            out.push(Insight {
                kind: InsightKind::Influence,
                text,
                score: edge.strength,
            });
        }
    }

    for baseline in baselines {
        if baseline.hour_amp < RHYTHM_MIN_AMP {
            continue;
        }
        out.push(Insight {
            kind: InsightKind::Rhythm,
            text: format!(
                "\"{}\" peaks around {:02}:00 UTC",
                baseline.type_name,
                baseline.hour_peak.round() as i64 % 24
            ),
            score: baseline.hour_amp / (1.0 + baseline.hour_amp),
        });
    }

    out.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.text.cmp(&b.text)));
    out.truncate(max_insights);
    out
}

/// Rough humanized lag: minutes below 2h, hours below 2 days, days beyond.
fn describe_lag_ms(lag_ms: f64) -> String {
    let minutes = lag_ms / 60_000.0;
    if minutes < 120.0 {
        format!("{} minutes", minutes.round().max(1.0) as i64)
    } else if minutes < 48.0 * 60.0 {
        format!("{} hours", (minutes / 60.0).round() as i64)
    } else {
        format!("{} days", (minutes / 1440.0).round() as i64)
    }
}
