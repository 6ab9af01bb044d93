//! Task wiring: sampler and dispatcher.
//!
//! The frame source (outside this crate) is the bus producer. The sampler
//! is the single writer over session state; dispatch and persistence run
//! behind a bounded queue so a slow provider never stalls classification,
//! and a single queue consumer keeps log appends in sample order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use ombak_core::bus::ObservationBus;
use ombak_core::observation::LogRecord;
use ombak_log::ObservationLog;
use ombak_notify::Notifier;
use ombak_telemetry::MetricsRecorder;

use crate::dispatch::dispatch_cycle;
use crate::session::{MonitoringSession, SampleCycle};

const DISPATCH_QUEUE_DEPTH: usize = 64;
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Spawns the sampler and dispatcher tasks for one monitoring stream.
///
/// The sampler drains `bus` until `terminate` is set and the bus is empty,
/// then closes the dispatch queue; the dispatcher drains remaining cycles
/// before exiting. Await both handles for a clean shutdown.
pub fn spawn_pipeline(
    mut session: MonitoringSession,
    bus: ObservationBus,
    notifier: Arc<dyn Notifier>,
    log: ObservationLog,
    provider_timeout: Duration,
    metrics: Arc<MetricsRecorder>,
    terminate: Arc<AtomicBool>,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let (cycle_tx, mut cycle_rx) = mpsc::channel::<SampleCycle>(DISPATCH_QUEUE_DEPTH);

    let sampler = tokio::spawn(async move {
        info!("Sampler started");
        session.set_streaming(true);

        loop {
            match bus.recv() {
                Some(measurement) => {
                    session.observe_frame(&measurement);
                    if session.sample_due() {
                        let cycle = session.sample(measurement);
                        if cycle_tx.send(cycle).await.is_err() {
                            warn!("Dispatch queue closed; stopping sampler");
                            break;
                        }
                    }
                }
                None => {
                    if terminate.load(Ordering::Relaxed) && bus.is_empty() {
                        break;
                    }
                    sleep(IDLE_POLL).await;
                }
            }
        }

        session.set_streaming(false);
        info!("Sampler stopped");
    });

    let dispatcher = tokio::spawn(async move {
        info!("Dispatcher started");
        while let Some(cycle) = cycle_rx.recv().await {
            let started = Instant::now();
            let outcomes =
                dispatch_cycle(&cycle, Arc::clone(&notifier), provider_timeout, &metrics).await;
            metrics
                .dispatch_latency
                .observe(started.elapsed().as_secs_f64());

            let record = LogRecord {
                observation: cycle.observation,
                extreme_count: cycle.extreme_count,
                escalation_fired: cycle.escalation_fired,
                outcomes,
            };
            if let Err(e) = log.append(&record) {
                // Losing one audit row must not stop sampling.
                warn!("Observation log append failed: {e}");
                metrics.log_errors_total.inc();
            } else {
                debug!(frame = record.observation.sequence_id, "Observation persisted");
            }
        }
        info!("Dispatcher stopped");
    });

    (sampler, dispatcher)
}
