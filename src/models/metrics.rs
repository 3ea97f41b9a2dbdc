//! Metric samples, probe results and per-cycle snapshots

use crate::types::{HealthDimension, MetricUnit, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single named measurement produced during one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
}

impl MetricSample {
    pub fn new<S: Into<String>>(name: S, value: f64, unit: MetricUnit) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
        }
    }
}

/// Ordered metric-name → sample mapping produced by one probe collector.
///
/// Non-finite values are dropped on insertion, so nothing downstream ever
/// sees a NaN or an infinity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Collector that produced this result
    pub source: String,
    samples: Vec<MetricSample>,
}

impl ProbeResult {
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self {
            source: source.into(),
            samples: Vec::new(),
        }
    }

    /// Insert or replace a sample, keeping first-insertion order
    pub fn insert<S: Into<String>>(&mut self, name: S, value: f64, unit: MetricUnit) {
        if !value.is_finite() {
            return;
        }
        let name = name.into();
        match self.samples.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                existing.value = value;
                existing.unit = unit;
            }
            None => self.samples.push(MetricSample::new(name, value, unit)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: f64, unit: MetricUnit) -> Self {
        self.insert(name, value, unit);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.samples.iter().find(|s| s.name == name).map(|s| s.value)
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Union of every probe result plus derived scores and trends for one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub timestamp: DateTime<Utc>,
    metrics: BTreeMap<String, MetricSample>,
}

impl Default for CycleSnapshot {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl CycleSnapshot {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            metrics: BTreeMap::new(),
        }
    }

    /// Merge a probe result into the snapshot; later values win on name clashes
    pub fn merge(&mut self, result: &ProbeResult) {
        for sample in result.samples() {
            self.insert(sample.clone());
        }
    }

    pub fn insert(&mut self, sample: MetricSample) {
        if sample.value.is_finite() {
            self.metrics.insert(sample.name.clone(), sample);
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|s| s.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// All samples in name order; every value is finite
    pub fn samples(&self) -> impl Iterator<Item = &MetricSample> {
        self.metrics.values()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Outcome of one health dimension for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub dimension: HealthDimension,
    pub severity: Severity,
    pub message: String,
}

impl HealthCheckResult {
    pub fn new<S: Into<String>>(dimension: HealthDimension, severity: Severity, message: S) -> Self {
        Self {
            dimension,
            severity,
            message: message.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.dimension.name()
    }
}
