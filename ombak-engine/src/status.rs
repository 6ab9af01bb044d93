//! Read-only status snapshot for dashboards.

use serde::Serialize;

use ombak_core::observation::{ChannelId, Severity};

/// Per-channel dispatch bookkeeping exposed to status readers.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatus {
    pub channel: ChannelId,
    /// Clock nanoseconds of the most recent attempt, failed or not.
    pub last_attempt_ns: Option<u64>,
}

/// Point-in-time view of the in-memory monitoring state. Cheap to clone;
/// carries no handles back into the session.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Whether the sampler task is currently draining the frame source.
    pub streaming: bool,
    pub frames_seen: u64,
    pub samples_written: u64,
    pub current_severity: Severity,
    pub current_height_px: i64,
    pub current_line_count: u32,
    pub consecutive_extreme: u32,
    pub last_escalation_ns: Option<u64>,
    pub channels: Vec<ChannelStatus>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            streaming: false,
            frames_seen: 0,
            samples_written: 0,
            current_severity: Severity::Calm,
            current_height_px: 0,
            current_line_count: 0,
            consecutive_extreme: 0,
            last_escalation_ns: None,
            channels: Vec::new(),
        }
    }
}
