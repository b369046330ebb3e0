//! Monitor for one ICE candidate pair.

use crate::records::CandidatePairStats;

use super::{counter_delta, elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct CandidatePairMonitor {
    pub stats: CandidatePairStats,
    visited: bool,

    pub delta_bytes_sent: u64,
    pub delta_bytes_received: u64,
}

impl CandidatePairMonitor {
    pub fn new(stats: CandidatePairStats) -> Self {
        Self {
            stats,
            visited: false,
            delta_bytes_sent: 0,
            delta_bytes_received: 0,
        }
    }

    pub fn accept(&mut self, next: CandidatePairStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        let prev = &self.stats;
        self.delta_bytes_sent = counter_delta(prev.bytes_sent, next.bytes_sent);
        self.delta_bytes_received = counter_delta(prev.bytes_received, next.bytes_received);
        self.stats = next;
    }

    pub fn create_sample(&self) -> CandidatePairStats {
        self.stats.clone()
    }

    /// Latest STUN round-trip time in milliseconds.
    pub fn round_trip_time_ms(&self) -> Option<f64> {
        self.stats.current_round_trip_time.map(|rtt| rtt * 1000.0)
    }

    pub fn available_outgoing_bitrate(&self) -> Option<f64> {
        self.stats.available_outgoing_bitrate
    }
}

impl_tracked!(CandidatePairMonitor);
