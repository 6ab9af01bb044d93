//! Monitoring session state: the single logical writer over escalation and
//! cooldown state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use ombak_config::OmbakConfig;
use ombak_core::channel::ChannelGate;
use ombak_core::escalation::EscalationTracker;
use ombak_core::observation::{ChannelId, FrameMeasurement, Observation, Severity, ThresholdSet};
use ombak_core::time::Clock;
use ombak_notify::destination;
use ombak_telemetry::MetricsRecorder;

use crate::error::EngineError;
use crate::message;
use crate::status::{ChannelStatus, StatusSnapshot};

/// One message ready to hand to the dispatcher: the channel, its normalized
/// destinations and the formatted body.
#[derive(Debug, Clone)]
pub struct PlannedSend {
    pub channel: ChannelId,
    pub recipients: Vec<String>,
    pub body: String,
}

/// Everything the dispatcher and the log need for one sampled observation.
#[derive(Debug, Clone)]
pub struct SampleCycle {
    pub observation: Observation,
    pub extreme_count: u32,
    pub escalation_fired: bool,
    pub sends: Vec<PlannedSend>,
    /// Channels evaluated this cycle but held back by severity or cooldown.
    pub skipped: Vec<ChannelId>,
}

struct ChannelRuntime {
    id: ChannelId,
    recipients: Vec<String>,
    gate: ChannelGate,
}

/// Owns one monitoring stream's mutable state. Exactly one task mutates a
/// session; dashboards read through the shared [`StatusSnapshot`] handle.
pub struct MonitoringSession {
    thresholds: ThresholdSet,
    tracker: EscalationTracker,
    channels: Vec<ChannelRuntime>,
    sample_interval_ns: u64,
    last_sample_ns: Option<u64>,
    location: Option<String>,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsRecorder>,
    status: Arc<RwLock<StatusSnapshot>>,
}

impl MonitoringSession {
    /// Builds a session from validated configuration.
    ///
    /// Channels that are enabled but unusable (no recipients) are disabled
    /// with one warning each. Zero enabled channels is the one operator
    /// state we refuse at startup.
    pub fn new(
        config: &OmbakConfig,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, EngineError> {
        if !config.channels.any_enabled() {
            return Err(EngineError::NoChannelsConfigured);
        }

        let escalation_cooldown = Duration::from_secs(config.escalation.cooldown_secs);
        let mut channels = Vec::new();

        let routine = [
            (
                ChannelId::RoutineWhatsApp,
                &config.channels.routine_whatsapp,
            ),
            (ChannelId::RoutineSms, &config.channels.routine_sms),
        ];
        for (id, channel_config) in routine {
            if !channel_config.enabled {
                continue;
            }
            let recipients = normalize_recipients(id, &channel_config.recipients);
            if recipients.is_empty() {
                warn!("Channel {id} is enabled but has no recipients; disabling it");
                continue;
            }
            channels.push(ChannelRuntime {
                id,
                recipients,
                gate: ChannelGate::new(Duration::from_secs(channel_config.cooldown_secs)),
            });
        }

        if config.channels.tsunami_whatsapp.enabled {
            let recipients = normalize_recipients(
                ChannelId::TsunamiWhatsApp,
                &config.channels.tsunami_whatsapp.recipients,
            );
            if recipients.is_empty() {
                warn!("Tsunami channel is enabled but has no recipients; disabling it");
            } else {
                channels.push(ChannelRuntime {
                    id: ChannelId::TsunamiWhatsApp,
                    recipients,
                    // The escalation cooldown already throttles this channel;
                    // the gate exists for attempt bookkeeping.
                    gate: ChannelGate::new(escalation_cooldown),
                });
            }
        }

        if channels.is_empty() {
            warn!("All enabled channels were disabled by configuration errors; running without alert dispatch");
        }

        let status = Arc::new(RwLock::new(StatusSnapshot {
            channels: channels
                .iter()
                .map(|c| ChannelStatus {
                    channel: c.id,
                    last_attempt_ns: None,
                })
                .collect(),
            ..StatusSnapshot::default()
        }));

        info!(
            channels = channels.len(),
            escalation_threshold = config.escalation.threshold,
            "Monitoring session initialized"
        );

        Ok(Self {
            thresholds: config.thresholds.as_set(),
            tracker: EscalationTracker::new(config.escalation.threshold, escalation_cooldown),
            channels,
            sample_interval_ns: Duration::from_secs(config.source.sample_interval_secs).as_nanos()
                as u64,
            last_sample_ns: None,
            location: config.location.clone(),
            clock,
            metrics,
            status,
        })
    }

    /// Classifies one frame and refreshes the live status. Runs on every
    /// frame; mutates no escalation or cooldown state.
    pub fn observe_frame(&mut self, measurement: &FrameMeasurement) -> Severity {
        let severity = ombak_core::classify::classify(measurement.height_px, &self.thresholds);
        self.metrics.frames_total.inc();

        let mut status = self.status.write();
        status.frames_seen += 1;
        status.current_severity = severity;
        status.current_height_px = measurement.height_px;
        status.current_line_count = measurement.line_count;
        severity
    }

    /// Whether the sampling cadence has elapsed since the last sample.
    pub fn sample_due(&self) -> bool {
        match self.last_sample_ns {
            None => true,
            Some(last) => self.clock.now_ns().saturating_sub(last) >= self.sample_interval_ns,
        }
    }

    /// Runs the full per-sample pipeline: classify, update the escalation
    /// run, evaluate channel eligibility and consume cooldowns. Cooldowns
    /// are consumed at plan time; delivery failures downstream do not give
    /// the window back.
    pub fn sample(&mut self, measurement: FrameMeasurement) -> SampleCycle {
        let now = self.clock.now_ns();
        let observation = Observation::from_measurement(measurement, &self.thresholds);
        let decision = self.tracker.observe(observation.severity, now);

        if decision.fired {
            self.metrics.escalations_total.inc();
            info!(
                consecutive_extreme = decision.consecutive_extreme,
                frame = observation.sequence_id,
                "Escalation fired: sustained extreme wave run"
            );
        }

        let mut sends = Vec::new();
        let mut skipped = Vec::new();
        for channel in &mut self.channels {
            let eligible = match channel.id {
                ChannelId::RoutineWhatsApp | ChannelId::RoutineSms => {
                    observation.severity.is_routine_alert() && channel.gate.may_fire(now)
                }
                ChannelId::TsunamiWhatsApp => decision.fired,
            };
            if !eligible {
                skipped.push(channel.id);
                continue;
            }

            channel.gate.record_attempt(now);
            let body = match channel.id {
                ChannelId::TsunamiWhatsApp => message::tsunami_body(
                    &observation,
                    decision.consecutive_extreme,
                    self.location.as_deref(),
                ),
                _ => message::routine_body(&observation, decision.consecutive_extreme),
            };
            sends.push(PlannedSend {
                channel: channel.id,
                recipients: channel.recipients.clone(),
                body,
            });
        }

        self.last_sample_ns = Some(now);
        self.metrics.samples_total.inc();

        {
            let mut status = self.status.write();
            status.samples_written += 1;
            status.consecutive_extreme = decision.consecutive_extreme;
            status.last_escalation_ns = self.tracker.last_escalation_ns();
            for channel in &self.channels {
                if let Some(entry) = status
                    .channels
                    .iter_mut()
                    .find(|c| c.channel == channel.id)
                {
                    entry.last_attempt_ns = channel.gate.last_attempt_ns();
                }
            }
        }

        SampleCycle {
            observation,
            extreme_count: decision.consecutive_extreme,
            escalation_fired: decision.fired,
            sends,
            skipped,
        }
    }

    /// Marks the sampler task as draining (or stopped) in the status view.
    pub fn set_streaming(&self, streaming: bool) {
        self.status.write().streaming = streaming;
    }

    /// Current snapshot, decoupled from session state.
    pub fn status(&self) -> StatusSnapshot {
        self.status.read().clone()
    }

    /// Shared handle for status readers that outlive the session borrow.
    pub fn status_handle(&self) -> Arc<RwLock<StatusSnapshot>> {
        Arc::clone(&self.status)
    }
}

fn normalize_recipients(id: ChannelId, recipients: &[String]) -> Vec<String> {
    recipients
        .iter()
        .flat_map(|entry| destination::split_recipients(entry))
        .map(|r| match id {
            ChannelId::RoutineSms => destination::normalize_sms(&r),
            _ => destination::normalize_whatsapp(&r),
        })
        .collect()
}
