//! Quality scoring
//!
//! Maps one cycle's raw probe metrics onto 0-100 scores. Everything here is
//! pure: the same snapshot always produces the same scores.

use crate::models::{CycleSnapshot, ProbeResult};
use crate::types::MetricUnit;

pub const SCORING_SOURCE: &str = "quality";

/// Fewest sub-scores an overall composite is computed from
pub const MIN_SUB_SCORES_FOR_OVERALL: usize = 2;

/// Relative weight of each sub-score in the overall composite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub latency: f64,
    pub stability: f64,
    pub http: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { latency: 0.4, stability: 0.4, http: 0.2 }
    }
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Score from average round-trip time.
///
/// 100 up to 1ms, then 100 -> 50 across (1, 10]ms, then 50 -> 0 across
/// (10, 50]ms. Anything slower scores 0.
pub fn latency_score(avg_ms: f64) -> f64 {
    let score = if avg_ms <= 1.0 {
        100.0
    } else if avg_ms <= 10.0 {
        100.0 - (avg_ms - 1.0) * 50.0 / 9.0
    } else if avg_ms <= 50.0 {
        50.0 - (avg_ms - 10.0) * 50.0 / 40.0
    } else {
        0.0
    };
    clamp_score(score)
}

/// Score from packet loss and RTT mean deviation
pub fn stability_score(loss_pct: f64, mdev_ms: f64) -> f64 {
    let jitter_penalty = (mdev_ms.max(0.0) * 10.0).min(50.0);
    clamp_score(100.0 - loss_pct.max(0.0) * 2.0 - jitter_penalty)
}

/// Score from time-to-first-byte.
///
/// 100 up to 5ms, 100 -> 10 across (5, 50]ms, then one point lost per
/// further 10ms.
pub fn http_score(ttfb_ms: f64) -> f64 {
    let score = if ttfb_ms <= 5.0 {
        100.0
    } else if ttfb_ms <= 50.0 {
        100.0 - (ttfb_ms - 5.0) * 2.0
    } else {
        10.0 - (ttfb_ms - 50.0) / 10.0
    };
    clamp_score(score)
}

/// Sub-scores available for one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityScores {
    pub latency: Option<f64>,
    pub stability: Option<f64>,
    pub http: Option<f64>,
    pub overall: Option<f64>,
}

impl QualityScores {
    pub fn available(&self) -> usize {
        [self.latency, self.stability, self.http].iter().filter(|s| s.is_some()).count()
    }

    pub fn into_result(self) -> Option<ProbeResult> {
        let mut result = ProbeResult::new(SCORING_SOURCE);
        let scores = [
            ("quality_latency_score", self.latency),
            ("quality_stability_score", self.stability),
            ("quality_http_score", self.http),
            ("quality_overall_score", self.overall),
        ];
        for (name, score) in scores {
            if let Some(score) = score {
                result.insert(name, score, MetricUnit::Score);
            }
        }
        (!result.is_empty()).then_some(result)
    }
}

/// Weighted composite of the available sub-scores.
///
/// Missing sub-scores contribute nothing; there is no renormalization.
pub fn overall_score(scores: &QualityScores, weights: &ScoreWeights) -> Option<f64> {
    if scores.available() < MIN_SUB_SCORES_FOR_OVERALL {
        return None;
    }
    let weighted = scores.latency.unwrap_or(0.0) * weights.latency
        + scores.stability.unwrap_or(0.0) * weights.stability
        + scores.http.unwrap_or(0.0) * weights.http;
    Some(clamp_score(weighted))
}

/// Derives quality scores from a cycle's probe metrics
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    weights: ScoreWeights,
}

impl QualityScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn score(&self, snapshot: &CycleSnapshot) -> QualityScores {
        let latency = snapshot.get("ping_avg_ms").map(latency_score);

        // Stability needs a deviation figure; loss alone is not enough
        let deviation = snapshot.get("ping_mdev_ms").or_else(|| snapshot.get("ping_jitter_ms"));
        let stability = deviation.map(|dev| {
            let loss = snapshot.get("ping_drop_rate")
                .or_else(|| snapshot.get("ping_success_rate").map(|s| 100.0 - s))
                .unwrap_or(0.0);
            stability_score(loss, dev)
        });

        let http = snapshot.get("http_ttfb_ms").map(http_score);

        let mut scores = QualityScores { latency, stability, http, overall: None };
        scores.overall = overall_score(&scores, &self.weights);
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricSample;
    use proptest::prelude::*;

    fn snapshot(metrics: &[(&str, f64)]) -> CycleSnapshot {
        let mut snapshot = CycleSnapshot::default();
        for (name, value) in metrics {
            snapshot.insert(MetricSample::new(*name, *value, MetricUnit::Milliseconds));
        }
        snapshot
    }

    #[test]
    fn test_latency_score_anchor_points() {
        assert_eq!(latency_score(0.5), 100.0);
        assert_eq!(latency_score(1.0), 100.0);
        assert!((latency_score(10.0) - 50.0).abs() < 1e-9);
        assert!((latency_score(30.0) - 25.0).abs() < 1e-9);
        assert_eq!(latency_score(50.0), 0.0);
        assert_eq!(latency_score(250.0), 0.0);
    }

    #[test]
    fn test_latency_score_in_first_band() {
        // 8ms sits 7/9 of the way through the 100 -> 50 band
        let expected = 100.0 - 7.0 * 50.0 / 9.0;
        assert!((latency_score(8.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_stability_score() {
        assert_eq!(stability_score(0.0, 0.0), 100.0);
        assert_eq!(stability_score(0.0, 1.0), 90.0);
        assert_eq!(stability_score(5.0, 2.0), 70.0);
        // Jitter penalty is capped at 50
        assert_eq!(stability_score(0.0, 30.0), 50.0);
        assert_eq!(stability_score(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_http_score() {
        assert_eq!(http_score(3.0), 100.0);
        assert_eq!(http_score(27.5), 55.0);
        assert_eq!(http_score(50.0), 10.0);
        assert_eq!(http_score(100.0), 5.0);
        assert_eq!(http_score(500.0), 0.0);
    }

    #[test]
    fn test_overall_needs_two_sub_scores() {
        let weights = ScoreWeights::default();
        let only_latency = QualityScores { latency: Some(90.0), ..Default::default() };
        assert_eq!(overall_score(&only_latency, &weights), None);

        let two = QualityScores { latency: Some(80.0), stability: Some(80.0), ..Default::default() };
        assert!((overall_score(&two, &weights).unwrap() - 64.0).abs() < 1e-9);

        let all = QualityScores { latency: Some(100.0), stability: Some(100.0), http: Some(100.0), overall: None };
        assert!((overall_score(&all, &weights).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_scorer_reads_snapshot() {
        let scores = QualityScorer::default().score(&snapshot(&[
            ("ping_avg_ms", 8.0),
            ("ping_mdev_ms", 1.0),
            ("ping_jitter_ms", 7.0),
            ("ping_success_rate", 100.0),
        ]));

        assert!(scores.latency.is_some());
        assert_eq!(scores.stability, Some(90.0));
        assert_eq!(scores.http, None);
        // Latency and stability are both present here
        assert!(scores.overall.is_some());
    }

    #[test]
    fn test_scorer_falls_back_to_jitter() {
        let scores = QualityScorer::default().score(&snapshot(&[("ping_jitter_ms", 2.0)]));
        assert_eq!(scores.stability, Some(80.0));
        assert_eq!(scores.overall, None);
    }

    #[test]
    fn test_scores_into_result() {
        let scores = QualityScores { latency: Some(50.0), ..Default::default() };
        let result = scores.into_result().unwrap();
        assert_eq!(result.get("quality_latency_score"), Some(50.0));
        assert_eq!(result.len(), 1);

        assert!(QualityScores::default().into_result().is_none());
    }

    proptest! {
        #[test]
        fn prop_latency_score_monotonic(a in 0.0f64..500.0, b in 0.0f64..500.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(latency_score(lo) >= latency_score(hi));
        }

        #[test]
        fn prop_http_score_monotonic(a in 0.0f64..5000.0, b in 0.0f64..5000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(http_score(lo) >= http_score(hi));
        }

        #[test]
        fn prop_scores_bounded(ms in -10.0f64..10_000.0, loss in 0.0f64..100.0, dev in 0.0f64..1000.0) {
            for score in [latency_score(ms), http_score(ms), stability_score(loss, dev)] {
                prop_assert!((0.0..=100.0).contains(&score));
            }
        }
    }
}
