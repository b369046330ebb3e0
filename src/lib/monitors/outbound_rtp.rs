//! Monitor for the send side of one RTP stream.

use ringbuffer::{AllocRingBuffer, RingBuffer};

use crate::records::{MediaKind, OutboundRtpStats, QualityLimitationReason};

use super::{bitrate, counter_delta, elapsed_seconds, impl_tracked};

/// Sliding-window capacity of the stability score.
const STABILITY_WINDOW: usize = 10;
/// Samples required before a stability score is emitted.
const STABILITY_MIN_SAMPLES: usize = STABILITY_WINDOW / 2;
/// RTT deviation (seconds) above which the latency factor bottoms out.
const STABILITY_RTT_SPAN_S: f64 = 0.1;

#[derive(Debug)]
pub struct OutboundRtpMonitor {
    pub stats: OutboundRtpStats,
    visited: bool,
    interval_advanced: bool,

    /// Bits per second sent over the last interval.
    pub sending_bitrate: f64,
    pub delta_bytes_sent: u64,
    pub delta_packets_sent: u64,
    pub delta_frames_encoded: u64,

    rtt_window: AllocRingBuffer<f64>,
    stability_window: AllocRingBuffer<f64>,
    /// Linearly-weighted stability over the window, available once the
    /// window holds at least half its capacity.
    pub stability_score: Option<f64>,
}

impl OutboundRtpMonitor {
    pub fn new(stats: OutboundRtpStats) -> Self {
        Self {
            stats,
            visited: false,
            interval_advanced: false,
            sending_bitrate: 0.0,
            delta_bytes_sent: 0,
            delta_packets_sent: 0,
            delta_frames_encoded: 0,
            rtt_window: AllocRingBuffer::new(STABILITY_WINDOW),
            stability_window: AllocRingBuffer::new(STABILITY_WINDOW),
            stability_score: None,
        }
    }

    pub fn accept(&mut self, next: OutboundRtpStats) {
        self.interval_advanced = false;
        let Some(elapsed_secs) = elapsed_seconds(self.stats.timestamp, next.timestamp) else {
            return;
        };
        let prev = &self.stats;

        self.delta_bytes_sent = counter_delta(prev.bytes_sent, next.bytes_sent);
        self.sending_bitrate = bitrate(self.delta_bytes_sent, elapsed_secs);
        self.delta_packets_sent = counter_delta(prev.packets_sent, next.packets_sent);
        self.delta_frames_encoded = counter_delta(prev.frames_encoded, next.frames_encoded);

        self.stats = next;
        self.interval_advanced = true;
    }

    /// Whether the last `accept` completed a new interval. False when the
    /// snapshot was rejected as stale, so retained deltas are not mistaken
    /// for fresh traffic.
    pub fn interval_advanced(&self) -> bool {
        self.interval_advanced
    }

    /// Feed one stability sample. The remote receiver's view (RTT and
    /// lost packets) comes from the remote-inbound counterpart, resolved
    /// by the coordinator during aggregation.
    pub fn record_stability_sample(&mut self, current_rtt_s: f64, lost_packets: u64) {
        self.rtt_window.push(current_rtt_s);
        let avg_rtt_s =
            self.rtt_window.iter().sum::<f64>() / self.rtt_window.len().max(1) as f64;

        let latency_factor = 1.0
            - (current_rtt_s - avg_rtt_s).abs().min(STABILITY_RTT_SPAN_S) / STABILITY_RTT_SPAN_S;
        let delivery_factor =
            1.0 - lost_packets as f64 / (lost_packets + self.delta_packets_sent.max(1)) as f64;

        let sample = (latency_factor * 0.33 + delivery_factor * 0.67).powi(2);
        self.stability_window.push(sample);

        self.stability_score = (self.stability_window.len() >= STABILITY_MIN_SAMPLES).then(|| {
            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for (position, value) in self.stability_window.iter().enumerate() {
                let weight = (position + 1) as f64;
                weighted_sum += weight * value;
                weight_total += weight;
            }
            weighted_sum / weight_total
        });
    }

    /// Wire-shaped projection: the raw snapshot only, no derived state.
    pub fn create_sample(&self) -> OutboundRtpStats {
        self.stats.clone()
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.stats.ssrc
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        self.stats.kind
    }

    pub fn is_cpu_limited(&self) -> bool {
        self.stats.quality_limitation_reason == Some(QualityLimitationReason::Cpu)
    }
}

impl_tracked!(OutboundRtpMonitor);

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: f64, bytes_sent: u64, packets_sent: u64) -> OutboundRtpStats {
        OutboundRtpStats {
            id: "OT01".into(),
            timestamp,
            ssrc: Some(4321),
            kind: Some(MediaKind::Video),
            bytes_sent: Some(bytes_sent),
            packets_sent: Some(packets_sent),
            ..Default::default()
        }
    }

    fn monitor_with_interval() -> OutboundRtpMonitor {
        let mut monitor = OutboundRtpMonitor::new(snapshot(0.0, 0, 0));
        monitor.accept(snapshot(1_000.0, 125_000, 100));
        monitor
    }

    #[test]
    fn test_sending_bitrate() {
        let monitor = monitor_with_interval();
        assert_eq!(monitor.sending_bitrate, 1_000_000.0);
        assert_eq!(monitor.delta_packets_sent, 100);
    }

    #[test]
    fn test_stability_needs_half_window() {
        let mut monitor = monitor_with_interval();
        for _ in 0..STABILITY_MIN_SAMPLES - 1 {
            monitor.record_stability_sample(0.05, 0);
            assert!(monitor.stability_score.is_none());
        }
        monitor.record_stability_sample(0.05, 0);
        assert!(monitor.stability_score.is_some());
    }

    #[test]
    fn test_perfect_delivery_steady_rtt_scores_one() {
        let mut monitor = monitor_with_interval();
        for _ in 0..STABILITY_WINDOW {
            monitor.record_stability_sample(0.05, 0);
        }
        // Steady RTT and zero loss: latency and delivery factors are both 1.
        let score = monitor.stability_score.unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_loss_degrades_stability() {
        let mut clean = monitor_with_interval();
        let mut lossy = monitor_with_interval();
        for _ in 0..STABILITY_WINDOW {
            clean.record_stability_sample(0.05, 0);
            lossy.record_stability_sample(0.05, 50);
        }
        assert!(lossy.stability_score.unwrap() < clean.stability_score.unwrap());
    }

    #[test]
    fn test_recent_samples_weigh_more() {
        let mut recovering = monitor_with_interval();
        // Half the window bad, then half good: the weighted mean should
        // sit above the plain mean because good samples came last.
        for _ in 0..STABILITY_MIN_SAMPLES {
            recovering.record_stability_sample(0.05, 100);
        }
        let degraded = recovering.stability_score.unwrap();
        for _ in 0..STABILITY_MIN_SAMPLES {
            recovering.record_stability_sample(0.05, 0);
        }
        assert!(recovering.stability_score.unwrap() > degraded);
    }
}
