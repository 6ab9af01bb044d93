//! Observation model: measurements, severity levels and dispatch records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal wave severity derived from peak height.
///
/// Variants are declared from least to most severe so the derived `Ord`
/// matches the escalation semantics (`severity >= High` selects the three
/// most severe labels).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Calm,
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl Severity {
    /// Operator-facing label, also used in notification bodies and the
    /// observation log. Labels deliberately contain punctuation; the log
    /// serializer must keep them in one column.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Calm => "calm",
            Severity::Low => "0.5 m (low)",
            Severity::Moderate => "1.25 m (moderate)",
            Severity::High => "2.5 m (high)",
            Severity::VeryHigh => "4 m (very high)",
            Severity::Extreme => "> 4 m (extreme)",
        }
    }

    /// Whether this severity qualifies for the routine high-wave channels.
    #[inline]
    pub fn is_routine_alert(&self) -> bool {
        *self >= Severity::High
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The five classification boundaries, in pixels from the top of the frame.
///
/// Smaller Y means higher on the frame, which means a taller wave, so the
/// boundaries normally descend from `low` to `extreme`. The classifier does
/// not require that: misordered sets are an operator mistake that gets a
/// startup warning, never a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub low: i64,
    pub moderate: i64,
    pub high: i64,
    pub very_high: i64,
    pub extreme: i64,
}

impl ThresholdSet {
    /// Boundaries paired with the severity they upgrade to, ordered from
    /// least to most severe. Classification keeps the last match.
    pub fn boundaries(&self) -> [(i64, Severity); 5] {
        [
            (self.low, Severity::Low),
            (self.moderate, Severity::Moderate),
            (self.high, Severity::High),
            (self.very_high, Severity::VeryHigh),
            (self.extreme, Severity::Extreme),
        ]
    }

    /// True when boundaries strictly descend from `low` to `extreme`.
    pub fn is_strictly_descending(&self) -> bool {
        self.low > self.moderate
            && self.moderate > self.high
            && self.high > self.very_high
            && self.very_high > self.extreme
    }
}

/// One raw per-frame measurement from the external vision pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMeasurement {
    /// Source-assigned, monotonically increasing frame index.
    pub sequence_id: u64,

    /// Smallest Y coordinate among detected wave-surface lines. The frame
    /// height is delivered when no lines were detected at all.
    pub height_px: i64,

    /// Number of detected lines, diagnostic only.
    pub line_count: u32,

    pub captured_at: DateTime<Utc>,
}

/// A classified measurement. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub sequence_id: u64,
    pub height_px: i64,
    pub line_count: u32,
    pub captured_at: DateTime<Utc>,
    pub severity: Severity,
}

impl Observation {
    pub fn from_measurement(measurement: FrameMeasurement, thresholds: &ThresholdSet) -> Self {
        let severity = crate::classify::classify(measurement.height_px, thresholds);
        Self {
            sequence_id: measurement.sequence_id,
            height_px: measurement.height_px,
            line_count: measurement.line_count,
            captured_at: measurement.captured_at,
            severity,
        }
    }
}

/// Notification channel identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
    RoutineWhatsApp,
    RoutineSms,
    TsunamiWhatsApp,
}

impl ChannelId {
    /// Stable channel order, also the order of outcomes in a log record.
    pub const ALL: [ChannelId; 3] = [
        ChannelId::RoutineWhatsApp,
        ChannelId::RoutineSms,
        ChannelId::TsunamiWhatsApp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelId::RoutineWhatsApp => "routine_whatsapp",
            ChannelId::RoutineSms => "routine_sms",
            ChannelId::TsunamiWhatsApp => "tsunami_whatsapp",
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure category recorded in a dispatch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchErrorKind {
    /// Channel misconfiguration detected at send time.
    Configuration,
    /// Provider rejected the message or the transport failed.
    Provider,
    /// Provider call exceeded the configured timeout.
    Timeout,
}

/// Per-channel result of one dispatch cycle. Produced fresh per sample,
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub channel: ChannelId,
    pub attempted: bool,
    pub succeeded: bool,
    pub provider_reference: Option<String>,
    pub error: Option<DispatchErrorKind>,
}

impl DispatchOutcome {
    /// Channel was evaluated but not fired this cycle (cooldown or severity).
    pub fn skipped(channel: ChannelId) -> Self {
        Self {
            channel,
            attempted: false,
            succeeded: false,
            provider_reference: None,
            error: None,
        }
    }

    pub fn success(channel: ChannelId, provider_reference: String) -> Self {
        Self {
            channel,
            attempted: true,
            succeeded: true,
            provider_reference: Some(provider_reference),
            error: None,
        }
    }

    pub fn failure(channel: ChannelId, error: DispatchErrorKind) -> Self {
        Self {
            channel,
            attempted: true,
            succeeded: false,
            provider_reference: None,
            error: Some(error),
        }
    }
}

/// Durable unit appended to the observation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub observation: Observation,
    /// Consecutive-extreme count at the time the sample was taken.
    pub extreme_count: u32,
    pub escalation_fired: bool,
    pub outcomes: Vec<DispatchOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_matches_declaration() {
        assert!(Severity::Calm < Severity::Low);
        assert!(Severity::VeryHigh < Severity::Extreme);
        assert!(Severity::High.is_routine_alert());
        assert!(Severity::Extreme.is_routine_alert());
        assert!(!Severity::Moderate.is_routine_alert());
    }

    #[test]
    fn descending_check_flags_misordered_sets() {
        let ordered = ThresholdSet {
            low: 280,
            moderate: 250,
            high: 230,
            very_high: 210,
            extreme: 180,
        };
        assert!(ordered.is_strictly_descending());

        let swapped = ThresholdSet {
            moderate: 280,
            low: 250,
            ..ordered
        };
        assert!(!swapped.is_strictly_descending());
    }
}
