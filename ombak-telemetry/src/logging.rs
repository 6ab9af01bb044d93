//! ## ombak-telemetry::logging
//! **Structured logging with tracing**
//!
//! One `init` at process start wires the subscriber; components then emit
//! ordinary `tracing` events. Alert-relevant moments (escalation fired,
//! dispatch failed, log append failed) go through [`EventLogger::log_event`]
//! so they carry uniform key/value metadata for downstream collection.

use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Safe to call more than once: later
    /// calls (tests, embedded use) are no-ops.
    pub fn init() {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_thread_names(true)
            .try_init();
    }

    /// Emits one structured monitoring event.
    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "monitoring_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );

        async {
            tracing::info!(
                metadata = ?metadata,
                "Monitoring event occurred"
            );
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logging() {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(EventLogger::log_event(
                "escalation_fired",
                vec![KeyValue::new("consecutive_extreme", 12i64)],
            ));
        assert!(logs_contain("Monitoring event occurred"));
    }

    #[test]
    fn repeated_init_is_harmless() {
        EventLogger::init();
        EventLogger::init();
    }
}
