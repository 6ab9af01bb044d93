//! Consecutive-extreme run tracking and escalation firing.

use std::time::Duration;

use crate::observation::Severity;

/// Result of feeding one observation to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationDecision {
    /// Escalation fires this cycle. Independent of whether the subsequent
    /// dispatch succeeds.
    pub fired: bool,
    /// Run length after this observation was applied.
    pub consecutive_extreme: u32,
}

/// Tracks the consecutive-extreme run for one monitoring stream.
///
/// A single non-extreme observation fully clears the run; there is no decay.
/// After a fire the count keeps growing and the cooldown alone throttles
/// re-fires, so a sustained extreme run re-alerts once per cooldown window
/// for as long as it lasts.
#[derive(Debug, Clone)]
pub struct EscalationTracker {
    consecutive_extreme: u32,
    threshold: u32,
    cooldown_ns: u64,
    last_escalation_ns: Option<u64>,
}

impl EscalationTracker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            consecutive_extreme: 0,
            threshold,
            cooldown_ns: cooldown.as_nanos() as u64,
            last_escalation_ns: None,
        }
    }

    /// Applies one observation and evaluates the escalation condition.
    pub fn observe(&mut self, severity: Severity, now_ns: u64) -> EscalationDecision {
        if severity == Severity::Extreme {
            self.consecutive_extreme = self.consecutive_extreme.saturating_add(1);
        } else {
            self.consecutive_extreme = 0;
        }

        let cooldown_elapsed = match self.last_escalation_ns {
            None => true,
            Some(last) => now_ns.saturating_sub(last) >= self.cooldown_ns,
        };

        let fired = self.consecutive_extreme >= self.threshold && cooldown_elapsed;
        if fired {
            self.last_escalation_ns = Some(now_ns);
        }

        EscalationDecision {
            fired,
            consecutive_extreme: self.consecutive_extreme,
        }
    }

    #[inline]
    pub fn consecutive_extreme(&self) -> u32 {
        self.consecutive_extreme
    }

    #[inline]
    pub fn last_escalation_ns(&self) -> Option<u64> {
        self.last_escalation_ns
    }
}
