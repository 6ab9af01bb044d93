//! Fan-out alert dispatch.
//!
//! Channels send concurrently and independently: one channel's failure or
//! latency never aborts or delays another's. There is no retry; a failed
//! attempt is reported in its outcome and the cooldown stays consumed.

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::KeyValue;
use tokio::task::JoinSet;
use tracing::warn;

use ombak_core::observation::{ChannelId, DispatchErrorKind, DispatchOutcome};
use ombak_notify::{Notifier, NotifyError};
use ombak_telemetry::logging::EventLogger;
use ombak_telemetry::MetricsRecorder;

use crate::session::{PlannedSend, SampleCycle};

/// Dispatches all planned sends of one sample cycle.
///
/// Returns one outcome per evaluated channel, in the stable
/// [`ChannelId::ALL`] order: skipped channels as non-attempts, planned
/// channels with their delivery result.
pub async fn dispatch_cycle(
    cycle: &SampleCycle,
    notifier: Arc<dyn Notifier>,
    provider_timeout: Duration,
    metrics: &MetricsRecorder,
) -> Vec<DispatchOutcome> {
    let mut join_set = JoinSet::new();
    for planned in cycle.sends.iter().cloned() {
        let notifier = Arc::clone(&notifier);
        join_set
            .spawn(async move { send_channel(planned, notifier, provider_timeout).await });
    }

    let mut outcomes: Vec<DispatchOutcome> = cycle
        .skipped
        .iter()
        .map(|&channel| DispatchOutcome::skipped(channel))
        .collect();

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(outcome) => {
                metrics
                    .dispatch_attempts
                    .with_label_values(&[outcome.channel.as_str()])
                    .inc();
                if !outcome.succeeded {
                    metrics
                        .dispatch_failures
                        .with_label_values(&[outcome.channel.as_str()])
                        .inc();
                    EventLogger::log_event(
                        "dispatch_failed",
                        vec![
                            KeyValue::new("channel", outcome.channel.as_str()),
                            KeyValue::new("frame", cycle.observation.sequence_id as i64),
                        ],
                    )
                    .await;
                }
                outcomes.push(outcome);
            }
            Err(e) => {
                // A panicked send task loses its channel identity; the cycle
                // still completes for the remaining channels.
                warn!("Dispatch task failed to complete: {e}");
            }
        }
    }

    outcomes.sort_by_key(|o| {
        ChannelId::ALL
            .iter()
            .position(|c| *c == o.channel)
            .unwrap_or(ChannelId::ALL.len())
    });
    outcomes
}

/// Sends one channel's message to each of its recipients in order. The
/// channel succeeds only when every recipient accepted; references are
/// joined for the outcome record.
async fn send_channel(
    planned: PlannedSend,
    notifier: Arc<dyn Notifier>,
    provider_timeout: Duration,
) -> DispatchOutcome {
    let mut references = Vec::with_capacity(planned.recipients.len());

    for recipient in &planned.recipients {
        let attempt = tokio::time::timeout(
            provider_timeout,
            notifier.send(recipient, &planned.body, None),
        )
        .await;

        match attempt {
            Ok(Ok(reference)) => references.push(reference),
            Ok(Err(e)) => {
                warn!(channel = %planned.channel, recipient, "Send failed: {e}");
                return DispatchOutcome::failure(planned.channel, error_kind(&e));
            }
            Err(_) => {
                warn!(channel = %planned.channel, recipient, "Send timed out");
                return DispatchOutcome::failure(planned.channel, DispatchErrorKind::Timeout);
            }
        }
    }

    DispatchOutcome::success(planned.channel, references.join(";"))
}

fn error_kind(error: &NotifyError) -> DispatchErrorKind {
    match error {
        NotifyError::MissingCredentials | NotifyError::MissingSender(_) => {
            DispatchErrorKind::Configuration
        }
        NotifyError::Transport(_) | NotifyError::Rejected { .. } => DispatchErrorKind::Provider,
    }
}
