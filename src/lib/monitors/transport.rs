//! Monitor for the ICE transport carrying the connection.

use crate::records::TransportStats;

use super::{counter_delta, elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct TransportMonitor {
    pub stats: TransportStats,
    visited: bool,

    pub delta_bytes_sent: u64,
    pub delta_bytes_received: u64,
    pub delta_packets_sent: u64,
    pub delta_packets_received: u64,
}

impl TransportMonitor {
    pub fn new(stats: TransportStats) -> Self {
        Self {
            stats,
            visited: false,
            delta_bytes_sent: 0,
            delta_bytes_received: 0,
            delta_packets_sent: 0,
            delta_packets_received: 0,
        }
    }

    pub fn accept(&mut self, next: TransportStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        let prev = &self.stats;
        self.delta_bytes_sent = counter_delta(prev.bytes_sent, next.bytes_sent);
        self.delta_bytes_received = counter_delta(prev.bytes_received, next.bytes_received);
        self.delta_packets_sent = counter_delta(prev.packets_sent, next.packets_sent);
        self.delta_packets_received =
            counter_delta(prev.packets_received, next.packets_received);
        self.stats = next;
    }

    pub fn create_sample(&self) -> TransportStats {
        self.stats.clone()
    }

    pub fn ice_state(&self) -> Option<&str> {
        self.stats.ice_state.as_deref()
    }

    pub fn selected_candidate_pair_id(&self) -> Option<&str> {
        self.stats.selected_candidate_pair_id.as_deref()
    }
}

impl_tracked!(TransportMonitor);
