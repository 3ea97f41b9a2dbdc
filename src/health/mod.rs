//! Health evaluation
//!
//! Each dimension is an ordered table of rules. The first rule whose
//! predicate matches decides the severity; its template is rendered with the
//! numeric evidence so the message stands on its own in an alert.

use crate::models::{CycleSnapshot, HealthCheckResult};
use crate::types::{HealthDimension, Severity};

/// Values a rule template can interpolate
pub trait Evidence {
    fn render(&self, template: &str) -> String;
}

impl Evidence for f64 {
    fn render(&self, template: &str) -> String {
        template.replace("{value}", &format!("{:.1}", self))
    }
}

/// Packet loss and RTT deviation, judged together
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityEvidence {
    pub loss_pct: f64,
    pub jitter_ms: f64,
}

impl Evidence for StabilityEvidence {
    fn render(&self, template: &str) -> String {
        template
            .replace("{loss}", &format!("{:.1}", self.loss_pct))
            .replace("{jitter}", &format!("{:.1}", self.jitter_ms))
    }
}

/// One row of a threshold table
pub struct HealthRule<I> {
    pub matches: fn(&I) -> bool,
    pub severity: Severity,
    pub template: &'static str,
}

/// First matching rule wins
pub fn evaluate_rules<I: Evidence>(rules: &[HealthRule<I>], input: &I) -> Option<(Severity, String)> {
    rules
        .iter()
        .find(|rule| (rule.matches)(input))
        .map(|rule| (rule.severity, input.render(rule.template)))
}

pub fn connectivity_rules() -> [HealthRule<f64>; 3] {
    [
        HealthRule { matches: |rate| *rate >= 95.0, severity: Severity::Ok, template: "Excellent connectivity: {value}% success rate" },
        HealthRule { matches: |rate| *rate >= 80.0, severity: Severity::Warning, template: "Degraded connectivity: {value}% success rate" },
        HealthRule { matches: |_| true, severity: Severity::Critical, template: "Poor connectivity: {value}% success rate" },
    ]
}

pub fn performance_rules() -> [HealthRule<f64>; 4] {
    [
        HealthRule { matches: |score| *score >= 80.0, severity: Severity::Ok, template: "Excellent performance: quality score {value}" },
        HealthRule { matches: |score| *score >= 60.0, severity: Severity::Warning, template: "Good performance: quality score {value}" },
        HealthRule { matches: |score| *score >= 40.0, severity: Severity::Warning, template: "Fair performance: quality score {value}" },
        HealthRule { matches: |_| true, severity: Severity::Critical, template: "Poor performance: quality score {value}" },
    ]
}

pub fn latency_rules() -> [HealthRule<f64>; 4] {
    [
        HealthRule { matches: |ms| *ms <= 5.0, severity: Severity::Ok, template: "Excellent latency: {value}ms average" },
        HealthRule { matches: |ms| *ms <= 20.0, severity: Severity::Warning, template: "Good latency: {value}ms average" },
        HealthRule { matches: |ms| *ms <= 50.0, severity: Severity::Warning, template: "Fair latency: {value}ms average" },
        HealthRule { matches: |_| true, severity: Severity::Critical, template: "High latency: {value}ms average" },
    ]
}

pub fn stability_rules() -> [HealthRule<StabilityEvidence>; 4] {
    [
        HealthRule {
            matches: |e| e.loss_pct == 0.0 && e.jitter_ms <= 1.0,
            severity: Severity::Ok,
            template: "Excellent stability: {loss}% loss, {jitter}ms jitter",
        },
        HealthRule {
            matches: |e| e.loss_pct <= 1.0 && e.jitter_ms <= 5.0,
            severity: Severity::Warning,
            template: "Good stability: {loss}% loss, {jitter}ms jitter",
        },
        HealthRule {
            matches: |e| e.loss_pct <= 5.0 && e.jitter_ms <= 10.0,
            severity: Severity::Warning,
            template: "Fair stability: {loss}% loss, {jitter}ms jitter",
        },
        HealthRule {
            matches: |_| true,
            severity: Severity::Critical,
            template: "Unstable link: {loss}% loss, {jitter}ms jitter",
        },
    ]
}

/// Maps a cycle's metrics to per-dimension health checks
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthEvaluator;

impl HealthEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Checks for every dimension that has evidence this cycle.
    ///
    /// An empty snapshot yields a single UNKNOWN connectivity check.
    pub fn evaluate(&self, snapshot: &CycleSnapshot) -> Vec<HealthCheckResult> {
        if snapshot.is_empty() {
            return vec![HealthCheckResult::new(
                HealthDimension::Connectivity,
                Severity::Unknown,
                "No metrics collected this cycle",
            )];
        }

        [
            Some(self.connectivity(snapshot)),
            self.performance(snapshot),
            self.latency(snapshot),
            self.stability(snapshot),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn connectivity(&self, snapshot: &CycleSnapshot) -> HealthCheckResult {
        match snapshot.get("ping_success_rate") {
            Some(rate) => check(HealthDimension::Connectivity, &connectivity_rules(), &rate),
            None => HealthCheckResult::new(
                HealthDimension::Connectivity,
                Severity::Unknown,
                "No ping data available to assess connectivity",
            ),
        }
    }

    /// `None` without an overall score, leaving the previous check in place downstream
    pub fn performance(&self, snapshot: &CycleSnapshot) -> Option<HealthCheckResult> {
        let score = snapshot.get("quality_overall_score")?;
        Some(check(HealthDimension::Performance, &performance_rules(), &score))
    }

    pub fn latency(&self, snapshot: &CycleSnapshot) -> Option<HealthCheckResult> {
        let avg = snapshot.get("ping_avg_ms")?;
        Some(check(HealthDimension::Latency, &latency_rules(), &avg))
    }

    pub fn stability(&self, snapshot: &CycleSnapshot) -> Option<HealthCheckResult> {
        let loss_pct = snapshot.get("ping_drop_rate")
            .or_else(|| snapshot.get("ping_success_rate").map(|rate| 100.0 - rate))?;
        let jitter_ms = snapshot.get("ping_mdev_ms").or_else(|| snapshot.get("ping_jitter_ms"))?;
        Some(check(HealthDimension::Stability, &stability_rules(), &StabilityEvidence { loss_pct, jitter_ms }))
    }
}

fn check<I: Evidence>(dimension: HealthDimension, rules: &[HealthRule<I>], input: &I) -> HealthCheckResult {
    match evaluate_rules(rules, input) {
        Some((severity, message)) => HealthCheckResult::new(dimension, severity, message),
        None => HealthCheckResult::new(dimension, Severity::Unknown, "No threshold matched"),
    }
}
