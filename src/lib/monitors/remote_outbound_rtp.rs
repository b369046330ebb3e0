//! Monitor for the remote sender report of one of our inbound streams.

use crate::records::RemoteOutboundRtpStats;

use super::{counter_delta, elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct RemoteOutboundRtpMonitor {
    pub stats: RemoteOutboundRtpStats,
    visited: bool,

    pub delta_packets_sent: u64,
}

impl RemoteOutboundRtpMonitor {
    pub fn new(stats: RemoteOutboundRtpStats) -> Self {
        Self {
            stats,
            visited: false,
            delta_packets_sent: 0,
        }
    }

    pub fn accept(&mut self, next: RemoteOutboundRtpStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        self.delta_packets_sent = counter_delta(self.stats.packets_sent, next.packets_sent);
        self.stats = next;
    }

    pub fn create_sample(&self) -> RemoteOutboundRtpStats {
        self.stats.clone()
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.stats.ssrc
    }

    /// Reported round-trip time in milliseconds.
    pub fn round_trip_time_ms(&self) -> Option<f64> {
        self.stats.round_trip_time.map(|rtt| rtt * 1000.0)
    }

    /// Whether the remote side appears to have stopped sending on purpose:
    /// it still reports, but its packet counter no longer advances.
    pub fn appears_paused(&self) -> bool {
        self.delta_packets_sent == 0 && self.stats.packets_sent.is_some()
    }
}

impl_tracked!(RemoteOutboundRtpMonitor);

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: f64, packets_sent: u64) -> RemoteOutboundRtpStats {
        RemoteOutboundRtpStats {
            id: "RO01".into(),
            timestamp,
            ssrc: Some(1234),
            packets_sent: Some(packets_sent),
            ..Default::default()
        }
    }

    #[test]
    fn test_paused_when_packet_counter_is_flat() {
        let mut monitor = RemoteOutboundRtpMonitor::new(snapshot(0.0, 100));
        monitor.accept(snapshot(1_000.0, 100));
        assert!(monitor.appears_paused());

        monitor.accept(snapshot(2_000.0, 150));
        assert!(!monitor.appears_paused());
    }
}
