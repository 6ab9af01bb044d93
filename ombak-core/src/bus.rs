//! SPSC ring buffer between the frame-source task and the sampler task.
//!
//! The frame source is the single producer and the sampler the single
//! consumer. The buffer is lock-free with cache-line aligned counters so a
//! full queue is reported to the producer immediately; ingest drops the
//! frame rather than block on sampler or dispatch latency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::observation::FrameMeasurement;

/// Observation bus error conditions.
#[derive(Error, Debug)]
pub enum BusError {
    #[error("observation queue capacity exceeded")]
    QueueFull,
    #[error("invalid capacity (must be a power of two)")]
    InvalidCapacity,
}

/// Cache-line aligned atomic counter to prevent false sharing.
#[repr(align(64))]
struct AlignedCounter(AtomicU64);

impl AlignedCounter {
    #[inline]
    fn new(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }
}

struct InnerBus {
    buffer: Box<[std::cell::UnsafeCell<Option<FrameMeasurement>>]>,
    head: AlignedCounter,
    tail: AlignedCounter,
    mask: usize,
}

/// Bounded queue of frame measurements awaiting classification.
pub struct ObservationBus {
    inner: Arc<InnerBus>,
}

impl ObservationBus {
    /// Creates a bus with the given capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Must be a power of two for efficient index masking.
    pub fn with_capacity(capacity: usize) -> Result<Self, BusError> {
        if !capacity.is_power_of_two() {
            return Err(BusError::InvalidCapacity);
        }

        let buffer = (0..capacity)
            .map(|_| std::cell::UnsafeCell::new(None))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            inner: Arc::new(InnerBus {
                buffer,
                head: AlignedCounter::new(0),
                tail: AlignedCounter::new(0),
                mask: capacity - 1,
            }),
        })
    }

    /// Creates a new handle to the shared bus.
    #[inline]
    pub fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Attempts to enqueue a measurement without blocking.
    ///
    /// # Safety
    ///
    /// Uses unsafe interior mutability guarded by the atomic counters.
    #[inline]
    pub fn send(&self, measurement: FrameMeasurement) -> Result<(), BusError> {
        let head = self.inner.head.0.load(Ordering::Relaxed);
        let tail = self.inner.tail.0.load(Ordering::Acquire);

        if head - tail >= self.inner.buffer.len() as u64 {
            return Err(BusError::QueueFull);
        }

        // SAFETY: Exclusive write access ensured by atomic counters
        unsafe {
            let idx = (head as usize) & self.inner.mask;
            *self.inner.buffer[idx].get() = Some(measurement)
        }

        self.inner.head.0.store(head + 1, Ordering::Release);
        Ok(())
    }

    /// Attempts to dequeue the oldest measurement.
    ///
    /// Returns `None` if the queue is empty.
    #[inline]
    pub fn recv(&self) -> Option<FrameMeasurement> {
        let tail = self.inner.tail.0.load(Ordering::Relaxed);
        let head = self.inner.head.0.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        // SAFETY: Exclusive read access ensured by atomic counters
        let measurement = unsafe {
            let idx = (tail as usize) & self.inner.mask;
            (*self.inner.buffer[idx].get()).take()
        };

        self.inner.tail.0.store(tail + 1, Ordering::Release);
        measurement
    }

    /// Number of queued measurements. Approximate under concurrency.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.inner.head.0.load(Ordering::Acquire);
        let tail = self.inner.tail.0.load(Ordering::Acquire);
        (head - tail) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// SAFETY: Thread safety ensured by atomic counters and Arc
unsafe impl Send for InnerBus {}
unsafe impl Sync for InnerBus {}
