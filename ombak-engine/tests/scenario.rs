//! End-to-end behavior of the monitoring session and dispatcher.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use ombak_config::OmbakConfig;
use ombak_core::bus::ObservationBus;
use ombak_core::observation::{ChannelId, FrameMeasurement, Severity};
use ombak_core::time::VirtualClock;
use ombak_engine::dispatch::dispatch_cycle;
use ombak_engine::runtime::spawn_pipeline;
use ombak_engine::{MonitoringSession, PlannedSend, SampleCycle};
use ombak_log::ObservationLog;
use ombak_notify::{Notifier, NotifyError};
use ombak_telemetry::MetricsRecorder;

const SEC: u64 = 1_000_000_000;

/// Records every accepted send; destinations listed in `fail` are rejected.
struct MockNotifier {
    fail: HashSet<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    fn new() -> Self {
        Self {
            fail: HashSet::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn failing_for(destinations: &[&str]) -> Self {
        Self {
            fail: destinations.iter().map(|d| d.to_string()).collect(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        _media_url: Option<&str>,
    ) -> Result<String, NotifyError> {
        if self.fail.contains(destination) {
            return Err(NotifyError::Rejected {
                status: 400,
                detail: "forced failure".into(),
            });
        }
        let mut sent = self.sent.lock();
        sent.push((destination.to_string(), body.to_string()));
        Ok(format!("SM{:04}", sent.len()))
    }
}

fn scenario_config() -> OmbakConfig {
    let mut config = OmbakConfig::default();
    config.source.sample_interval_secs = 1;
    config.escalation.threshold = 12;
    config.location = Some("South Beach breakwater".into());
    config.channels.routine_whatsapp.enabled = true;
    config.channels.routine_whatsapp.recipients = vec!["+6281111111111".into()];
    config.channels.routine_sms.enabled = true;
    config.channels.routine_sms.recipients = vec!["+6282222222222".into()];
    config.channels.tsunami_whatsapp.enabled = true;
    config.channels.tsunami_whatsapp.recipients = vec!["+6283333333333".into()];
    config
}

fn measurement(seq: u64, height: i64) -> FrameMeasurement {
    FrameMeasurement {
        sequence_id: seq,
        height_px: height,
        line_count: 3,
        captured_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
            + chrono::Duration::seconds(seq as i64 * 2),
    }
}

#[test]
fn sustained_extreme_run_escalates_exactly_once() {
    let clock = Arc::new(VirtualClock::new(0));
    let mut session = MonitoringSession::new(
        &scenario_config(),
        clock.clone(),
        Arc::new(MetricsRecorder::new()),
    )
    .unwrap();

    let mut heights: Vec<i64> = vec![300, 260, 240, 200];
    heights.extend(std::iter::repeat(170).take(12));
    heights.push(300);

    let mut cycles: Vec<SampleCycle> = Vec::new();
    for (i, height) in heights.iter().enumerate() {
        clock.advance(2 * SEC);
        let m = measurement(i as u64 + 1, *height);
        session.observe_frame(&m);
        assert!(session.sample_due());
        cycles.push(session.sample(m));
    }

    let severities: Vec<Severity> = cycles.iter().map(|c| c.observation.severity).collect();
    let mut expected = vec![
        Severity::Calm,
        Severity::Low,
        Severity::Moderate,
        Severity::VeryHigh,
    ];
    expected.extend(std::iter::repeat(Severity::Extreme).take(12));
    expected.push(Severity::Calm);
    assert_eq!(severities, expected);

    let fired: Vec<usize> = cycles
        .iter()
        .enumerate()
        .filter(|(_, c)| c.escalation_fired)
        .map(|(i, _)| i)
        .collect();
    // Exactly one escalation, on the 12th consecutive extreme sample.
    assert_eq!(fired, vec![15]);
    assert_eq!(cycles[15].extreme_count, 12);

    let tsunami = cycles[15]
        .sends
        .iter()
        .find(|p| p.channel == ChannelId::TsunamiWhatsApp)
        .expect("tsunami channel fires with the escalation");
    assert!(tsunami.body.contains("12 consecutive EXTREME"));
    assert!(tsunami.body.contains("South Beach breakwater"));

    // The closing calm frame clears the run.
    assert_eq!(cycles[16].extreme_count, 0);
    assert_eq!(session.status().consecutive_extreme, 0);

    // Routine channels fired on the first eligible sample and then stayed
    // inside their cooldown for the rest of the run.
    assert!(cycles[3]
        .sends
        .iter()
        .any(|p| p.channel == ChannelId::RoutineWhatsApp));
    let routine_fires = cycles
        .iter()
        .flat_map(|c| c.sends.iter())
        .filter(|p| p.channel == ChannelId::RoutineWhatsApp)
        .count();
    assert_eq!(routine_fires, 1);
}

#[tokio::test]
async fn one_failing_channel_does_not_block_the_others() {
    let notifier = Arc::new(MockNotifier::failing_for(&["+6282222222222"]));
    let metrics = MetricsRecorder::new();

    let cycle = SampleCycle {
        observation: ombak_core::observation::Observation {
            sequence_id: 99,
            height_px: 170,
            line_count: 4,
            captured_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            severity: Severity::Extreme,
        },
        extreme_count: 12,
        escalation_fired: true,
        sends: vec![
            PlannedSend {
                channel: ChannelId::RoutineWhatsApp,
                recipients: vec!["whatsapp:+6281111111111".into()],
                body: "routine".into(),
            },
            PlannedSend {
                channel: ChannelId::RoutineSms,
                recipients: vec!["+6282222222222".into()],
                body: "routine".into(),
            },
            PlannedSend {
                channel: ChannelId::TsunamiWhatsApp,
                recipients: vec!["whatsapp:+6283333333333".into()],
                body: "tsunami".into(),
            },
        ],
        skipped: vec![],
    };

    let outcomes =
        dispatch_cycle(&cycle, notifier.clone(), Duration::from_secs(5), &metrics).await;

    assert_eq!(outcomes.len(), 3);
    // Stable channel order regardless of completion order.
    let channels: Vec<ChannelId> = outcomes.iter().map(|o| o.channel).collect();
    assert_eq!(channels, ChannelId::ALL.to_vec());

    assert!(outcomes[0].succeeded);
    assert!(outcomes[0].provider_reference.is_some());
    assert!(!outcomes[1].succeeded);
    assert!(outcomes[1].attempted);
    assert!(outcomes[2].succeeded);

    // Both surviving channels actually reached the provider.
    assert_eq!(notifier.sent.lock().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_persists_every_sampled_observation() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("observations.csv");

    let clock = Arc::new(VirtualClock::new(0));
    let metrics = Arc::new(MetricsRecorder::new());
    let session =
        MonitoringSession::new(&scenario_config(), clock.clone(), metrics.clone()).unwrap();
    let bus = ObservationBus::with_capacity(64).unwrap();
    let notifier = Arc::new(MockNotifier::new());
    let terminate = Arc::new(AtomicBool::new(false));

    let (sampler, dispatcher) = spawn_pipeline(
        session,
        bus.share(),
        notifier.clone(),
        ObservationLog::new(&log_path),
        Duration::from_secs(5),
        metrics,
        terminate.clone(),
    );

    for (i, height) in [300i64, 250, 220, 200, 170].iter().enumerate() {
        // Advance past the sampling interval before the frame arrives so
        // every frame is sampled.
        clock.advance(2 * SEC);
        bus.send(measurement(i as u64 + 1, *height)).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    terminate.store(true, Ordering::Relaxed);
    sampler.await.unwrap();
    dispatcher.await.unwrap();

    let rows = ObservationLog::new(&log_path).read_rows().unwrap();
    assert_eq!(rows.len(), 5);
    let frames: Vec<u64> = rows.iter().map(|r| r.frame).collect();
    assert_eq!(frames, vec![1, 2, 3, 4, 5]);
    assert!(rows.iter().all(|r| !r.escalation_fired));

    // Height 220 was the first routine-eligible sample; the mock saw both
    // routine channels exactly once thanks to their cooldowns.
    assert_eq!(notifier.sent.lock().len(), 2);
}
