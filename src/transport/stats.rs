// Request counters for one transport: round trips, failures, received bytes.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

struct RateSample {
    at: Instant,
    received_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransportSnapshot {
    pub requests: u64,
    pub failures: u64,
    pub received_bytes: u64,
    pub receive_bps: u64,
    pub in_flight: u32,
}

pub struct TransportStats {
    requests_total: AtomicU64,
    failures_total: AtomicU64,
    received_bytes_total: AtomicU64,
    in_flight: AtomicU32,
    last_sample: Mutex<RateSample>,
}

impl TransportStats {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            failures_total: AtomicU64::new(0),
            received_bytes_total: AtomicU64::new(0),
            in_flight: AtomicU32::new(0),
            last_sample: Mutex::new(RateSample {
                at: Instant::now(),
                received_bytes: 0,
            }),
        }
    }

    /// Marks a request as started. The returned guard ends it when dropped,
    /// including when the awaiting future is cancelled.
    pub fn begin(&self) -> InFlight<'_> {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlight { stats: self }
    }

    pub fn record_received(&self, bytes: u64) {
        self.received_bytes_total.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        let now = Instant::now();
        let received = self.received_bytes_total.load(Ordering::Relaxed);

        let receive_bps = {
            let mut sample = self.last_sample.lock();
            let elapsed = now.duration_since(sample.at).as_secs_f64();
            let bps = if elapsed > 0.1 {
                ((received - sample.received_bytes) as f64 / elapsed) as u64
            } else {
                0
            };
            sample.at = now;
            sample.received_bytes = received;
            bps
        };

        TransportSnapshot {
            requests: self.requests_total.load(Ordering::Relaxed),
            failures: self.failures_total.load(Ordering::Relaxed),
            received_bytes: received,
            receive_bps,
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }
}

impl Default for TransportStats {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InFlight<'a> {
    stats: &'a TransportStats,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
