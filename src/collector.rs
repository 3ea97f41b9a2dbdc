//! Collection cycle driver and run loop
//!
//! One cycle runs every probe in order, scores the merged metrics, updates
//! the trend window, evaluates health and hands everything to the emitter.
//! Probes run strictly one after another against the single target.

use crate::{
    emitter::MetricsEmitter,
    error::{AppError, Result},
    health::HealthEvaluator,
    logging::{CollectorLogger, Logger},
    models::{Config, CycleSnapshot, HealthCheckResult, MetricSample},
    probes::{
        CommandRunner, DownloadSampler, HttpDownloadSampler, HttpPageFetcher, HttpTimingCollector,
        PageFetcher, PingCollector, ProbeCollector, SystemCommandRunner, ThroughputEstimator,
        WebInterfaceCollector,
    },
    scoring::QualityScorer,
    trend::TrendTracker,
    types::{HealthDimension, MetricUnit, Severity},
};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// What happened to one probe during a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Collected(usize),
    NoData,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub source: &'static str,
    pub outcome: ProbeOutcome,
    pub elapsed: Duration,
}

/// Everything one cycle produced
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub snapshot: CycleSnapshot,
    pub health_checks: Vec<HealthCheckResult>,
    pub sources: Vec<SourceReport>,
    /// Metrics successfully handed to the emitter
    pub metrics_sent: usize,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn worst_severity(&self) -> Option<Severity> {
        self.health_checks.iter().map(|c| c.severity).max()
    }

    pub fn is_connected(&self) -> bool {
        self.snapshot.get("connectivity") == Some(1.0)
    }
}

/// Owns the probes and the cross-cycle trend state
pub struct CycleDriver {
    target: String,
    collectors: Vec<Box<dyn ProbeCollector>>,
    scorer: QualityScorer,
    trend: TrendTracker,
    health: HealthEvaluator,
    emitter: Arc<dyn MetricsEmitter>,
    logger: CollectorLogger,
}

impl CycleDriver {
    pub fn new(
        target: String,
        collectors: Vec<Box<dyn ProbeCollector>>,
        emitter: Arc<dyn MetricsEmitter>,
        logger: CollectorLogger,
    ) -> Self {
        Self {
            target,
            collectors,
            scorer: QualityScorer::default(),
            trend: TrendTracker::default(),
            health: HealthEvaluator::new(),
            emitter,
            logger,
        }
    }

    pub fn builder(config: &Config, emitter: Arc<dyn MetricsEmitter>) -> CycleDriverBuilder<'_> {
        CycleDriverBuilder::new(config, emitter)
    }

    pub fn trend(&self) -> &TrendTracker {
        &self.trend
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Run one full collection cycle.
    ///
    /// Individual probe failures are absorbed. An error here means the cycle
    /// could not deliver anything at all.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let started = Instant::now();
        let cycle_id = self.logger.cycle_started(&self.target).await;
        let mut snapshot = CycleSnapshot::new(Utc::now());
        let mut sources = Vec::with_capacity(self.collectors.len());

        for collector in &self.collectors {
            let probe_started = Instant::now();
            let outcome = match collector.collect().await {
                Ok(Some(result)) => {
                    snapshot.merge(&result);
                    self.logger.probe_succeeded(&cycle_id, collector.name(), result.len(), probe_started.elapsed()).await;
                    ProbeOutcome::Collected(result.len())
                }
                Ok(None) => {
                    self.logger.probe_empty(&cycle_id, collector.name()).await;
                    ProbeOutcome::NoData
                }
                Err(e) => {
                    self.logger.probe_failed(&cycle_id, collector.name(), &e).await;
                    ProbeOutcome::Failed(e.to_string())
                }
            };
            sources.push(SourceReport { source: collector.name(), outcome, elapsed: probe_started.elapsed() });
        }

        if let Some(scores) = self.scorer.score(&snapshot).into_result() {
            snapshot.merge(&scores);
        }
        if let Some(trends) = self.trend.observe(&snapshot) {
            snapshot.merge(&trends);
        }

        let health_checks = self.health.evaluate(&snapshot);

        let total_metrics = snapshot.len();
        let connected = if total_metrics > 0 { 1.0 } else { 0.0 };
        snapshot.insert(MetricSample::new("connectivity", connected, MetricUnit::Count));
        if total_metrics > 0 {
            snapshot.insert(MetricSample::new("total_metrics", total_metrics as f64, MetricUnit::Count));
        }

        let metrics_sent = self.emit(&cycle_id, &snapshot, &health_checks).await?;

        let report = CycleReport {
            snapshot,
            health_checks,
            sources,
            metrics_sent,
            elapsed: started.elapsed(),
        };
        self.logger.cycle_completed(&cycle_id, total_metrics, report.health_checks.len(), report.elapsed).await;
        Ok(report)
    }

    async fn emit(&self, cycle_id: &str, snapshot: &CycleSnapshot, checks: &[HealthCheckResult]) -> Result<usize> {
        let mut sent = 0;
        let mut failed = 0;

        for sample in snapshot.samples() {
            match self.emitter.emit_metric(&sample.name, sample.value).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    self.logger.emit_failed(&sample.name, &e).await;
                }
            }
        }

        let mut checks_sent = 0;
        for check in checks {
            self.logger.health_check(cycle_id, check).await;
            match self.emitter.emit_health_check(check).await {
                Ok(()) => checks_sent += 1,
                Err(e) => {
                    failed += 1;
                    self.logger.emit_failed(check.name(), &e).await;
                }
            }
        }

        if sent == 0 && checks_sent == 0 && failed > 0 {
            return Err(AppError::emit(format!("all {} sends failed", failed)));
        }

        let counters = [
            ("collector.metrics_total", sent as f64),
            ("collector.health_checks_total", checks_sent as f64),
        ];
        for (name, value) in counters {
            if let Err(e) = self.emitter.emit_metric(name, value).await {
                self.logger.emit_failed(name, &e).await;
            }
        }

        Ok(sent)
    }

    /// Best-effort CRITICAL connectivity check for an abandoned cycle.
    /// Also logged locally, as the emitter is usually what failed.
    async fn report_failure(&self, error: &AppError) -> HealthCheckResult {
        let check = HealthCheckResult::new(
            HealthDimension::Connectivity,
            Severity::Critical,
            format!("Collection cycle failed: {}", error),
        );
        self.logger.health_check("-", &check).await;
        if let Err(e) = self.emitter.emit_health_check(&check).await {
            self.logger.emit_failed(check.name(), &e).await;
        }
        check
    }

    /// Cycle until `shutdown` flips to true.
    ///
    /// Shutdown is checked before each cycle; an in-flight cycle always
    /// completes, but the pause between cycles is cut short.
    pub async fn run(&mut self, interval: Duration, backoff: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let pause = match self.run_cycle().await {
                Ok(_) => interval,
                Err(e) => {
                    self.logger.cycle_failed(&e, backoff).await;
                    self.report_failure(&e).await;
                    backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.logger.logger().info("Collector stopped").log().await;
    }
}

/// Wires the standard probe set from configuration
pub struct CycleDriverBuilder<'a> {
    config: &'a Config,
    emitter: Arc<dyn MetricsEmitter>,
    runner: Option<Arc<dyn CommandRunner>>,
    sampler: Option<Arc<dyn DownloadSampler>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    logger: Option<CollectorLogger>,
    throughput_pause: Duration,
}

impl<'a> CycleDriverBuilder<'a> {
    fn new(config: &'a Config, emitter: Arc<dyn MetricsEmitter>) -> Self {
        Self {
            config,
            emitter,
            runner: None,
            sampler: None,
            fetcher: None,
            logger: None,
            throughput_pause: crate::defaults::THROUGHPUT_PAUSE,
        }
    }

    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn sampler(mut self, sampler: Arc<dyn DownloadSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn logger(mut self, logger: CollectorLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn throughput_pause(mut self, pause: Duration) -> Self {
        self.throughput_pause = pause;
        self
    }

    pub fn build(self) -> Result<CycleDriver> {
        let config = self.config;
        let client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()?;
        let url = config.gateway_url();

        let runner = self.runner.unwrap_or_else(|| Arc::new(SystemCommandRunner));
        let sampler = self.sampler.unwrap_or_else(|| Arc::new(HttpDownloadSampler::new(client.clone())));

        let mut collectors: Vec<Box<dyn ProbeCollector>> = vec![
            Box::new(PingCollector::new(
                config.gateway_ip.clone(),
                config.ping_count,
                config.ping_interval_secs,
                config.ping_timeout(),
                runner.clone(),
            )?),
            Box::new(HttpTimingCollector::new(url.clone(), config.http_timeout(), runner)),
            Box::new(ThroughputEstimator::new(url.clone(), sampler).with_pause(self.throughput_pause)),
        ];

        if config.enable_web_scrape {
            let fetcher = self.fetcher.unwrap_or_else(|| Arc::new(HttpPageFetcher::new(client)));
            collectors.push(Box::new(WebInterfaceCollector::new(url, fetcher)?));
        }

        let logger = self.logger.unwrap_or_else(|| {
            CollectorLogger::new(Logger::with_config("COLLECTOR".to_string(), config))
        });

        Ok(CycleDriver::new(config.gateway_ip.clone(), collectors, self.emitter, logger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::MemoryEmitter;
    use crate::models::ProbeResult;
    use async_trait::async_trait;

    struct StaticCollector(Option<ProbeResult>);

    #[async_trait]
    impl ProbeCollector for StaticCollector {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn collect(&self) -> Result<Option<ProbeResult>> {
            Ok(self.0.clone())
        }
    }

    struct FailingCollector;

    #[async_trait]
    impl ProbeCollector for FailingCollector {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn collect(&self) -> Result<Option<ProbeResult>> {
            Err(AppError::timeout("ping did not finish"))
        }
    }

    struct BrokenEmitter;

    #[async_trait]
    impl MetricsEmitter for BrokenEmitter {
        async fn emit_metric(&self, _name: &str, _value: f64) -> Result<()> {
            Err(AppError::emit("socket closed"))
        }

        async fn emit_health_check(&self, _check: &HealthCheckResult) -> Result<()> {
            Err(AppError::emit("socket closed"))
        }
    }

    fn quiet_logger() -> CollectorLogger {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_level(crate::logging::LogLevel::Fatal);
        CollectorLogger::new(logger)
    }

    fn ping_result() -> ProbeResult {
        ProbeResult::new("ping")
            .with("ping_avg_ms", 4.0, MetricUnit::Milliseconds)
            .with("ping_mdev_ms", 0.5, MetricUnit::Milliseconds)
            .with("ping_success_rate", 100.0, MetricUnit::Percent)
            .with("ping_drop_rate", 0.0, MetricUnit::Percent)
    }

    fn driver(collectors: Vec<Box<dyn ProbeCollector>>, emitter: Arc<dyn MetricsEmitter>) -> CycleDriver {
        CycleDriver::new("192.168.1.1".to_string(), collectors, emitter, quiet_logger())
    }

    #[tokio::test]
    async fn test_cycle_merges_scores_and_health() {
        let emitter = Arc::new(MemoryEmitter::new());
        let mut driver = driver(
            vec![Box::new(StaticCollector(Some(ping_result()))), Box::new(FailingCollector)],
            emitter.clone(),
        );

        let report = driver.run_cycle().await.unwrap();

        assert!(report.is_connected());
        assert_eq!(report.sources[0].outcome, ProbeOutcome::Collected(4));
        assert!(matches!(report.sources[1].outcome, ProbeOutcome::Failed(_)));
        assert!(report.snapshot.contains("quality_latency_score"));
        assert_eq!(report.snapshot.get("quality_stability_score"), Some(95.0));
        assert_eq!(report.health_checks.len(), 4);

        assert_eq!(emitter.metric("connectivity").await, Some(1.0));
        assert_eq!(emitter.metric("ping_avg_ms").await, Some(4.0));
        assert_eq!(emitter.metric("collector.metrics_total").await, Some(report.metrics_sent as f64));
        assert_eq!(emitter.metric("collector.health_checks_total").await, Some(4.0));
        // 4 ping + 3 quality + connectivity + total_metrics
        assert_eq!(emitter.metric("total_metrics").await, Some(7.0));
        assert_eq!(report.metrics_sent, 9);
    }

    #[tokio::test]
    async fn test_empty_cycle_reports_unknown() {
        let emitter = Arc::new(MemoryEmitter::new());
        let mut driver = driver(vec![Box::new(StaticCollector(None)), Box::new(FailingCollector)], emitter.clone());

        let report = driver.run_cycle().await.unwrap();

        assert!(!report.is_connected());
        assert_eq!(report.health_checks.len(), 1);
        assert_eq!(report.worst_severity(), Some(Severity::Unknown));
        assert_eq!(emitter.metric("connectivity").await, Some(0.0));
        assert_eq!(emitter.metric("total_metrics").await, None);
    }

    #[tokio::test]
    async fn test_trend_appears_after_three_cycles() {
        let emitter = Arc::new(MemoryEmitter::new());
        let mut driver = driver(vec![Box::new(StaticCollector(Some(ping_result())))], emitter);

        for _ in 0..2 {
            let report = driver.run_cycle().await.unwrap();
            assert!(!report.snapshot.contains("trend_ping_avg_ms_pct"));
        }
        let report = driver.run_cycle().await.unwrap();
        assert_eq!(report.snapshot.get("trend_ping_avg_ms_pct"), Some(0.0));
        assert_eq!(report.snapshot.get("volatility_ping_avg_ms"), Some(0.0));
        assert_eq!(driver.trend().history().len(), 3);
    }

    #[tokio::test]
    async fn test_total_emit_failure_fails_cycle() {
        let mut driver = driver(vec![Box::new(StaticCollector(Some(ping_result())))], Arc::new(BrokenEmitter));
        let result = driver.run_cycle().await;
        assert!(matches!(result, Err(AppError::Emit(_))));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let emitter = Arc::new(MemoryEmitter::new());
        let mut driver = driver(vec![Box::new(StaticCollector(Some(ping_result())))], emitter.clone());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            driver.run(Duration::from_secs(3600), Duration::from_secs(30), rx).await;
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert_eq!(emitter.metric("connectivity").await, Some(1.0));
    }

    #[tokio::test]
    async fn test_run_reports_failed_cycle() {
        struct CheckOnlyEmitter(MemoryEmitter);

        #[async_trait]
        impl MetricsEmitter for CheckOnlyEmitter {
            async fn emit_metric(&self, _name: &str, _value: f64) -> Result<()> {
                Err(AppError::emit("metrics rejected"))
            }

            async fn emit_health_check(&self, check: &HealthCheckResult) -> Result<()> {
                if check.message.starts_with("Collection cycle failed") {
                    self.0.emit_health_check(check).await
                } else {
                    Err(AppError::emit("checks rejected"))
                }
            }
        }

        let emitter = Arc::new(CheckOnlyEmitter(MemoryEmitter::new()));
        let mut driver = driver(vec![Box::new(StaticCollector(Some(ping_result())))], emitter.clone());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            driver.run(Duration::from_secs(3600), Duration::from_secs(3600), rx).await;
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        let checks = emitter.0.health_checks().await;
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].severity, Severity::Critical);
        assert_eq!(checks[0].dimension, HealthDimension::Connectivity);
    }

    #[tokio::test]
    async fn test_failure_check_survives_broken_emitter() {
        let driver = driver(vec![], Arc::new(BrokenEmitter));
        let check = driver.report_failure(&AppError::emit("all 3 sends failed")).await;

        assert_eq!(check.dimension, HealthDimension::Connectivity);
        assert_eq!(check.severity, Severity::Critical);
        assert_eq!(check.message, "Collection cycle failed: Emit error: all 3 sends failed");
        assert_eq!(crate::logging::health_check_level(check.severity), crate::logging::LogLevel::Warn);
    }

    #[test]
    fn test_builder_respects_web_scrape_flag() {
        let emitter: Arc<dyn MetricsEmitter> = Arc::new(MemoryEmitter::new());

        let config = Config::default();
        let driver = CycleDriver::builder(&config, emitter.clone()).logger(quiet_logger()).build().unwrap();
        assert_eq!(driver.collector_names(), vec!["ping", "http", "throughput", "web"]);

        let config = Config { enable_web_scrape: false, ..Default::default() };
        let driver = CycleDriver::builder(&config, emitter).logger(quiet_logger()).build().unwrap();
        assert_eq!(driver.collector_names(), vec!["ping", "http", "throughput"]);
    }
}
