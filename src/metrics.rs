//! Metrics collection and export module

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Counters
    pub tx_submitted: IntCounter,
    pub tx_confirmed: IntCounter,
    pub tx_failed: IntCounter,
    pub wallet_rejections: IntCounter,
    pub precheck_rejections: IntCounterVec,
    pub read_failures: IntCounterVec,

    // Histograms
    pub confirmation_latency: Histogram,
    pub read_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let tx_submitted = IntCounter::with_opts(Opts::new(
            "dropper_tx_submitted_total",
            "Transactions accepted by the node",
        ))?;

        let tx_confirmed = IntCounter::with_opts(Opts::new(
            "dropper_tx_confirmed_total",
            "Transactions mined successfully",
        ))?;

        let tx_failed = IntCounter::with_opts(Opts::new(
            "dropper_tx_failed_total",
            "Transactions that reverted or could not be observed",
        ))?;

        let wallet_rejections = IntCounter::with_opts(Opts::new(
            "dropper_wallet_rejections_total",
            "Writes refused by the wallet or node before broadcast",
        ))?;

        let precheck_rejections = IntCounterVec::new(
            Opts::new(
                "dropper_precheck_rejections_total",
                "Actions rejected by local preconditions",
            ),
            &["reason"],
        )?;

        let read_failures = IntCounterVec::new(
            Opts::new("dropper_read_failures_total", "Failed on-chain reads"),
            &["field"],
        )?;

        let confirmation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "dropper_confirmation_latency_seconds",
                "Time from submission to receipt",
            )
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;

        let read_latency = Histogram::with_opts(
            HistogramOpts::new("dropper_read_latency_seconds", "Contract read latency")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0]),
        )?;

        // Register all metrics
        registry.register(Box::new(tx_submitted.clone()))?;
        registry.register(Box::new(tx_confirmed.clone()))?;
        registry.register(Box::new(tx_failed.clone()))?;
        registry.register(Box::new(wallet_rejections.clone()))?;
        registry.register(Box::new(precheck_rejections.clone()))?;
        registry.register(Box::new(read_failures.clone()))?;
        registry.register(Box::new(confirmation_latency.clone()))?;
        registry.register(Box::new(read_latency.clone()))?;

        Ok(Self {
            registry,
            tx_submitted,
            tx_confirmed,
            tx_failed,
            wallet_rejections,
            precheck_rejections,
            read_failures,
            confirmation_latency,
            read_latency,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn observe_duration(&self, histogram: &Histogram) {
        histogram.observe(self.elapsed_secs());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
