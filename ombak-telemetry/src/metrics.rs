//! ## ombak-telemetry::metrics
//! **Prometheus exporter for the monitoring pipeline**
//!
//! Counters cover the ingest and dispatch paths; the histogram tracks how
//! long a full dispatch cycle takes relative to the provider timeout.

use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    /// Frames received from the source, sampled or not.
    pub frames_total: Counter,
    /// Observations that went through the full sample pipeline.
    pub samples_total: Counter,
    /// Escalations fired by the tracker.
    pub escalations_total: Counter,
    /// Dispatch attempts per channel.
    pub dispatch_attempts: CounterVec,
    /// Failed dispatch attempts per channel (provider error or timeout).
    pub dispatch_failures: CounterVec,
    /// Observation-log append failures.
    pub log_errors_total: Counter,
    /// Wall time of one dispatch cycle across all eligible channels.
    pub dispatch_latency: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let frames_total =
            Counter::new("ombak_frames_total", "Frames received from the source").unwrap();
        let samples_total =
            Counter::new("ombak_samples_total", "Observations sampled and persisted").unwrap();
        let escalations_total =
            Counter::new("ombak_escalations_total", "Tsunami escalations fired").unwrap();
        let dispatch_attempts = CounterVec::new(
            Opts::new("ombak_dispatch_attempts_total", "Dispatch attempts"),
            &["channel"],
        )
        .unwrap();
        let dispatch_failures = CounterVec::new(
            Opts::new("ombak_dispatch_failures_total", "Failed dispatch attempts"),
            &["channel"],
        )
        .unwrap();
        let log_errors_total =
            Counter::new("ombak_log_errors_total", "Observation log append failures").unwrap();
        let dispatch_latency = Histogram::with_opts(
            HistogramOpts::new(
                "ombak_dispatch_latency_seconds",
                "Wall time of one dispatch cycle",
            )
            .buckets(vec![0.05, 0.25, 1.0, 5.0, 15.0]),
        )
        .unwrap();

        registry.register(Box::new(frames_total.clone())).unwrap();
        registry.register(Box::new(samples_total.clone())).unwrap();
        registry
            .register(Box::new(escalations_total.clone()))
            .unwrap();
        registry
            .register(Box::new(dispatch_attempts.clone()))
            .unwrap();
        registry
            .register(Box::new(dispatch_failures.clone()))
            .unwrap();
        registry
            .register(Box::new(log_errors_total.clone()))
            .unwrap();
        registry
            .register(Box::new(dispatch_latency.clone()))
            .unwrap();

        Self {
            registry,
            frames_total,
            samples_total,
            escalations_total,
            dispatch_attempts,
            dispatch_failures,
            log_errors_total,
            dispatch_latency,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}
