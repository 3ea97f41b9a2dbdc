//! Short-term trend tracking over a bounded history window

use crate::models::{CycleSnapshot, ProbeResult};
use crate::stats;
use crate::types::MetricUnit;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};

pub const TREND_SOURCE: &str = "trend";

/// Default number of cycles kept for trending
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Fewest points a trend or volatility figure is computed from
pub const MIN_TREND_POINTS: usize = 3;

/// Metrics followed across cycles
pub const TRACKED_METRICS: &[&str] = &["ping_avg_ms", "throughput_avg_mbps", "quality_overall_score"];

/// Fixed-capacity FIFO queue; pushing onto a full window evicts the oldest entry
#[derive(Debug, Clone)]
pub struct HistoryWindow<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> HistoryWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append an entry, returning the evicted one if the window was full
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }
}

impl<T> Default for HistoryWindow<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// The tracked subset of one cycle's metrics
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<&'static str, f64>,
}

/// Percentage change from the oldest to the newest value.
///
/// `None` when the oldest value is exactly zero.
pub fn trend_pct(earliest: f64, latest: f64) -> Option<f64> {
    if earliest == 0.0 {
        None
    } else {
        Some((latest - earliest) / earliest * 100.0)
    }
}

/// Owns the history window and derives trend figures from it
#[derive(Debug, Clone, Default)]
pub struct TrendTracker {
    history: HistoryWindow<HistoryPoint>,
}

impl TrendTracker {
    pub fn new(capacity: usize) -> Self {
        Self { history: HistoryWindow::new(capacity) }
    }

    pub fn history(&self) -> &HistoryWindow<HistoryPoint> {
        &self.history
    }

    /// Record this cycle's tracked metrics, then compute trends over the window
    pub fn observe(&mut self, snapshot: &CycleSnapshot) -> Option<ProbeResult> {
        let values = TRACKED_METRICS
            .iter()
            .filter_map(|&name| snapshot.get(name).map(|value| (name, value)))
            .collect();
        self.history.push(HistoryPoint { timestamp: snapshot.timestamp, values });
        self.trends()
    }

    /// Trend percentage and volatility for each tracked metric with enough points
    pub fn trends(&self) -> Option<ProbeResult> {
        let mut result = ProbeResult::new(TREND_SOURCE);

        for &metric in TRACKED_METRICS {
            let series: Vec<f64> = self.history
                .iter()
                .filter_map(|point| point.values.get(metric).copied())
                .collect();
            if series.len() < MIN_TREND_POINTS {
                continue;
            }

            if let Some(pct) = trend_pct(series[0], series[series.len() - 1]) {
                result.insert(format!("trend_{}_pct", metric), pct, MetricUnit::Percent);
            }
            if let Some(volatility) = stats::sample_std_dev(&series) {
                result.insert(format!("volatility_{}", metric), volatility, MetricUnit::Count);
            }
        }

        (!result.is_empty()).then_some(result)
    }
}
