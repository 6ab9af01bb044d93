//! Per-channel cooldown gating.

use std::time::Duration;

/// Cooldown gate for one notification channel.
///
/// An attempt consumes the window whether or not delivery succeeds. Each
/// channel owns exactly one gate; gates are never shared.
#[derive(Debug, Clone)]
pub struct ChannelGate {
    cooldown_ns: u64,
    last_attempt_ns: Option<u64>,
}

impl ChannelGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown_ns: cooldown.as_nanos() as u64,
            last_attempt_ns: None,
        }
    }

    /// True when no attempt was made yet or the cooldown has elapsed.
    #[inline]
    pub fn may_fire(&self, now_ns: u64) -> bool {
        match self.last_attempt_ns {
            None => true,
            Some(last) => now_ns.saturating_sub(last) >= self.cooldown_ns,
        }
    }

    /// Marks an attempt, successful or not.
    #[inline]
    pub fn record_attempt(&mut self, now_ns: u64) {
        self.last_attempt_ns = Some(now_ns);
    }

    #[inline]
    pub fn last_attempt_ns(&self) -> Option<u64> {
        self.last_attempt_ns
    }
}
