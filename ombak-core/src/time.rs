//! Clock abstraction for cooldown and escalation timing.
//!
//! Gating logic takes plain nanosecond values so the tracker and gates stay
//! pure; the engine supplies them through a [`Clock`]. Production uses
//! [`WallClock`]; tests and replay use [`VirtualClock`] for deterministic
//! cooldown arithmetic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanosecond time source.
pub trait Clock: Send + Sync {
    fn now_ns(&self) -> u64;
}

/// System time since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_ns(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_nanos() as u64
    }
}

/// A seedable clock that only moves when advanced.
#[derive(Clone)]
pub struct VirtualClock {
    offset: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a virtual clock starting at `seed` nanoseconds.
    pub fn new(seed: u64) -> Self {
        Self {
            offset: Arc::new(AtomicU64::new(seed)),
        }
    }

    /// Advances the clock by the given number of nanoseconds.
    #[inline]
    pub fn advance(&self, ns: u64) {
        self.offset.fetch_add(ns, Ordering::Release);
    }
}

impl Clock for VirtualClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_initial_value() {
        let clock = VirtualClock::new(100);
        assert_eq!(clock.now_ns(), 100);
    }

    #[test]
    fn virtual_clock_advances() {
        let clock = VirtualClock::new(0);
        clock.advance(500);
        assert_eq!(clock.now_ns(), 500);
        clock.advance(250);
        assert_eq!(clock.now_ns(), 750);
    }

    #[test]
    fn wall_clock_is_monotone_enough() {
        let clock = WallClock;
        let a = clock.now_ns();
        let b = clock.now_ns();
        assert!(b >= a);
    }
}
