use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use ombak_config::OmbakConfig;
use ombak_core::bus::ObservationBus;
use ombak_core::observation::LogRecord;
use ombak_core::time::{VirtualClock, WallClock};
use ombak_engine::dispatch::dispatch_cycle;
use ombak_engine::runtime::spawn_pipeline;
use ombak_engine::MonitoringSession;
use ombak_log::ObservationLog;
use ombak_notify::{Notifier, NotifyError, TwilioNotifier, TwilioSettings};
use ombak_source::{load_measurements, run_ndjson_loop};
use ombak_telemetry::MetricsRecorder;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitor a live measurement stream (NDJSON lines on stdin or a file)
    Run(RunArgs),
    /// Replay a recorded measurement file deterministically
    Replay(ReplayArgs),
    /// Load and validate the configuration, reporting warnings
    CheckConfig(CheckConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file; defaults to config/ombak.yaml when present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Measurement input, `-` for stdin. Overrides the configured source.
    #[arg(short, long)]
    pub input: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Recorded NDJSON measurement file to replay.
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CheckConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn load_config(path: &Option<PathBuf>) -> anyhow::Result<OmbakConfig> {
    let config = match path {
        Some(path) => OmbakConfig::load_from_path(path)?,
        None => OmbakConfig::load()?,
    };
    for warning in config.startup_warnings() {
        warn!("{warning}");
    }
    Ok(config)
}

/// Stand-in notifier when provider credentials are absent: every attempt
/// fails with a configuration outcome instead of taking the process down.
struct UnconfiguredNotifier;

#[async_trait]
impl Notifier for UnconfiguredNotifier {
    async fn send(
        &self,
        _destination: &str,
        _body: &str,
        _media_url: Option<&str>,
    ) -> Result<String, NotifyError> {
        Err(NotifyError::MissingCredentials)
    }
}

fn build_notifier(config: &OmbakConfig) -> Arc<dyn Notifier> {
    let twilio = &config.channels.twilio;
    let settings = TwilioSettings {
        account_sid: twilio.account_sid.clone(),
        auth_token: twilio.auth_token.clone(),
        whatsapp_from: twilio.whatsapp_from.clone(),
        sms_from: twilio.sms_from.clone(),
        messaging_service_sid: twilio.messaging_service_sid.clone(),
    };
    match TwilioNotifier::new(settings) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            warn!("Messaging provider unavailable ({e}); alert attempts will be recorded as configuration failures");
            Arc::new(UnconfiguredNotifier)
        }
    }
}

pub async fn run_monitoring(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let metrics = Arc::new(MetricsRecorder::new());
    let clock = Arc::new(WallClock);

    let session = MonitoringSession::new(&config, clock, metrics.clone())?;
    let status = session.status_handle();
    let notifier = build_notifier(&config);
    let bus = ObservationBus::with_capacity(config.source.bus_capacity)
        .map_err(|e| anyhow::anyhow!("observation bus: {e}"))?;
    let log = ObservationLog::new(config.log.path.clone());
    let terminate = Arc::new(AtomicBool::new(false));

    let (sampler, dispatcher) = spawn_pipeline(
        session,
        bus.share(),
        notifier,
        log,
        Duration::from_secs(config.channels.provider_timeout_secs),
        metrics,
        terminate.clone(),
    );

    let input = args.input.unwrap_or_else(|| config.source.input.clone());
    info!(%input, "Starting measurement ingest");

    let ingest_terminate = terminate.clone();
    let ingest = tokio::task::spawn_blocking(move || {
        let reader: Box<dyn BufRead> = if input == "-" {
            Box::new(BufReader::new(std::io::stdin()))
        } else {
            match File::open(&input) {
                Ok(file) => Box::new(BufReader::new(file)),
                Err(e) => {
                    warn!("Failed to open measurement input '{input}': {e}");
                    return;
                }
            }
        };

        let ingest_bus = bus.share();
        run_ndjson_loop(reader, &ingest_terminate, |measurement| {
            // Ingest never blocks on sampler latency; a full queue drops
            // the frame.
            if ingest_bus.send(measurement).is_err() {
                warn!("Observation queue full; dropping frame");
            }
        });
    });

    ingest.await?;
    // Source exhausted: let the sampler drain what is queued, then stop.
    terminate.store(true, Ordering::Relaxed);
    sampler.await?;
    dispatcher.await?;

    let status = status.read().clone();
    info!(
        frames = status.frames_seen,
        samples = status.samples_written,
        "Measurement stream ended"
    );
    Ok(())
}

pub async fn run_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let measurements = load_measurements(&args.file)?;
    if measurements.is_empty() {
        anyhow::bail!("no measurements in {}", args.file.display());
    }
    info!(
        count = measurements.len(),
        file = %args.file.display(),
        "Replaying recorded measurements"
    );

    let metrics = Arc::new(MetricsRecorder::new());
    let clock = Arc::new(VirtualClock::new(0));
    let mut session = MonitoringSession::new(&config, clock.clone(), metrics.clone())?;
    let notifier = build_notifier(&config);
    let log = ObservationLog::new(config.log.path.clone());
    let provider_timeout = Duration::from_secs(config.channels.provider_timeout_secs);

    let mut previous_at: Option<chrono::DateTime<chrono::Utc>> = None;
    let mut escalations = 0usize;
    for measurement in measurements {
        // Drive the virtual clock with the recorded capture times so
        // cooldown behavior replays exactly.
        if let Some(previous) = previous_at {
            let delta = (measurement.captured_at - previous)
                .num_nanoseconds()
                .unwrap_or(0)
                .max(0) as u64;
            clock.advance(delta);
        }
        previous_at = Some(measurement.captured_at);

        session.observe_frame(&measurement);
        if !session.sample_due() {
            continue;
        }

        let cycle = session.sample(measurement);
        if cycle.escalation_fired {
            escalations += 1;
        }
        let outcomes = dispatch_cycle(&cycle, notifier.clone(), provider_timeout, &metrics).await;
        let record = LogRecord {
            observation: cycle.observation,
            extreme_count: cycle.extreme_count,
            escalation_fired: cycle.escalation_fired,
            outcomes,
        };
        log.append(&record)?;
    }

    let status = session.status();
    println!(
        "Replay complete: {} frames, {} samples, {} escalations (log: {})",
        status.frames_seen,
        status.samples_written,
        escalations,
        log.path().display()
    );
    Ok(())
}

pub fn check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;

    let enabled = [
        ("routine_whatsapp", config.channels.routine_whatsapp.enabled),
        ("routine_sms", config.channels.routine_sms.enabled),
        ("tsunami_whatsapp", config.channels.tsunami_whatsapp.enabled),
    ];
    println!("Configuration OK");
    println!(
        "  thresholds: low={} moderate={} high={} very_high={} extreme={}",
        config.thresholds.low,
        config.thresholds.moderate,
        config.thresholds.high,
        config.thresholds.very_high,
        config.thresholds.extreme
    );
    println!(
        "  escalation: {} consecutive extremes, {}s cooldown",
        config.escalation.threshold, config.escalation.cooldown_secs
    );
    for (name, on) in enabled {
        println!("  channel {name}: {}", if on { "enabled" } else { "disabled" });
    }
    if !config.channels.any_enabled() {
        println!("  warning: no channels enabled; `run` will refuse to start");
    }
    if !config.channels.twilio.has_credentials() {
        println!("  warning: Twilio credentials not configured");
    }
    Ok(())
}
