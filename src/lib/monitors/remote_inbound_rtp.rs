//! Monitor for the remote receiver report of one of our outbound streams.

use crate::records::RemoteInboundRtpStats;

use super::{elapsed_seconds, impl_tracked, signed_delta};

#[derive(Debug)]
pub struct RemoteInboundRtpMonitor {
    pub stats: RemoteInboundRtpStats,
    visited: bool,

    pub delta_packets_lost: i64,
}

impl RemoteInboundRtpMonitor {
    pub fn new(stats: RemoteInboundRtpStats) -> Self {
        Self {
            stats,
            visited: false,
            delta_packets_lost: 0,
        }
    }

    pub fn accept(&mut self, next: RemoteInboundRtpStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        self.delta_packets_lost = signed_delta(self.stats.packets_lost, next.packets_lost);
        self.stats = next;
    }

    pub fn create_sample(&self) -> RemoteInboundRtpStats {
        self.stats.clone()
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.stats.ssrc
    }

    /// Reported round-trip time in milliseconds.
    pub fn round_trip_time_ms(&self) -> Option<f64> {
        self.stats.round_trip_time.map(|rtt| rtt * 1000.0)
    }
}

impl_tracked!(RemoteInboundRtpMonitor);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtt_converted_to_ms() {
        let monitor = RemoteInboundRtpMonitor::new(RemoteInboundRtpStats {
            id: "RI01".into(),
            timestamp: 0.0,
            round_trip_time: Some(0.05),
            ..Default::default()
        });
        assert_eq!(monitor.round_trip_time_ms(), Some(50.0));
    }

    #[test]
    fn test_lost_packets_delta_can_go_negative() {
        let mut monitor = RemoteInboundRtpMonitor::new(RemoteInboundRtpStats {
            id: "RI01".into(),
            timestamp: 0.0,
            packets_lost: Some(10),
            ..Default::default()
        });
        monitor.accept(RemoteInboundRtpStats {
            id: "RI01".into(),
            timestamp: 1_000.0,
            packets_lost: Some(7),
            ..Default::default()
        });
        assert_eq!(monitor.delta_packets_lost, -3);
    }
}
