//! Statistical helpers for round-trip and throughput samples
//!
//! All functions are total: empty or undersized inputs yield `None` or an
//! explicit fallback value rather than NaN.

use serde::{Deserialize, Serialize};

/// Minimum sample count before the 95th percentile is computed from the data;
/// smaller sets report their maximum instead.
pub const MIN_PERCENTILE_SAMPLES: usize = 20;

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Median, averaging the two middle values for even-sized inputs
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation (n - 1 denominator); a single value yields 0
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    if values.len() <= 1 {
        return Some(0.0);
    }
    let variance = values.iter()
        .map(|x| (x - avg).powi(2))
        .sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Population standard deviation (n denominator), as ping reports `mdev`
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter()
        .map(|x| (x - avg).powi(2))
        .sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Nearest-rank percentile (no interpolation) for `pct` in (0, 100]
pub fn percentile_nearest_rank(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() || !(pct > 0.0 && pct <= 100.0) {
        return None;
    }
    let sorted = sorted_copy(values);
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.clamp(1, sorted.len()) - 1;
    Some(sorted[index])
}

/// 95th percentile, or the maximum when fewer than
/// [`MIN_PERCENTILE_SAMPLES`] values are available
pub fn p95_or_max(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_PERCENTILE_SAMPLES {
        max(values)
    } else {
        percentile_nearest_rank(values, 95.0)
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Distribution summary of per-packet round-trip times
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RttDistribution {
    pub count: usize,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub stdev_ms: f64,
    pub mdev_ms: f64,
    pub p95_ms: f64,
}

impl RttDistribution {
    /// Summarize a set of round-trip times; `None` for an empty set
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        Some(Self {
            count: samples.len(),
            min_ms: min(samples)?,
            avg_ms: mean(samples)?,
            max_ms: max(samples)?,
            median_ms: median(samples)?,
            stdev_ms: sample_std_dev(samples)?,
            mdev_ms: population_std_dev(samples)?,
            p95_ms: p95_or_max(samples)?,
        })
    }
}

#[cfg(test)]
mod comprehensive_tests;
