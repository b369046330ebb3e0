//! Monitor for the receive side of one RTP stream.

use crate::records::{InboundRtpStats, MediaKind};

use super::{bitrate, counter_delta, elapsed_seconds, fraction_lost, impl_tracked, signed_delta};

/// Holds the latest inbound-rtp snapshot plus per-interval derived fields.
///
/// A snapshot is only accepted when it is strictly newer than the held
/// one; on rejection every derived field keeps its previous value.
#[derive(Debug)]
pub struct InboundRtpMonitor {
    pub stats: InboundRtpStats,
    visited: bool,
    interval_advanced: bool,

    /// Bits per second received over the last interval.
    pub receiving_bitrate: f64,
    pub delta_bytes_received: u64,
    pub delta_packets_received: u64,
    pub delta_packets_lost: i64,
    /// Interval loss ratio, `lost / (lost + received)`.
    pub fraction_lost: f64,
    /// Average jitter buffer residency per emitted sample, in ms.
    pub avg_jitter_buffer_delay_ms: f64,
    pub delta_frames_received: u64,
    pub delta_frames_decoded: u64,
    pub delta_frames_rendered: u64,
    pub delta_freeze_count: u64,
    pub delta_fec_packets_received: u64,
    pub delta_concealed_samples: u64,
}

impl InboundRtpMonitor {
    pub fn new(stats: InboundRtpStats) -> Self {
        Self {
            stats,
            visited: false,
            interval_advanced: false,
            receiving_bitrate: 0.0,
            delta_bytes_received: 0,
            delta_packets_received: 0,
            delta_packets_lost: 0,
            fraction_lost: 0.0,
            avg_jitter_buffer_delay_ms: 0.0,
            delta_frames_received: 0,
            delta_frames_decoded: 0,
            delta_frames_rendered: 0,
            delta_freeze_count: 0,
            delta_fec_packets_received: 0,
            delta_concealed_samples: 0,
        }
    }

    pub fn accept(&mut self, next: InboundRtpStats) {
        self.interval_advanced = false;
        let Some(elapsed_secs) = elapsed_seconds(self.stats.timestamp, next.timestamp) else {
            return;
        };
        let prev = &self.stats;

        self.delta_bytes_received = counter_delta(prev.bytes_received, next.bytes_received);
        self.receiving_bitrate = bitrate(self.delta_bytes_received, elapsed_secs);

        self.delta_packets_received = counter_delta(prev.packets_received, next.packets_received);
        self.delta_packets_lost = signed_delta(prev.packets_lost, next.packets_lost);
        self.fraction_lost = fraction_lost(self.delta_packets_lost, self.delta_packets_received);

        if let (Some(prev_delay), Some(next_delay)) =
            (prev.jitter_buffer_delay, next.jitter_buffer_delay)
        {
            let emitted = counter_delta(
                prev.jitter_buffer_emitted_count,
                next.jitter_buffer_emitted_count,
            )
            .max(1);
            self.avg_jitter_buffer_delay_ms = ((next_delay - prev_delay) / emitted as f64) * 1000.0;
        }

        self.delta_frames_received = counter_delta(prev.frames_received, next.frames_received);
        self.delta_frames_decoded = counter_delta(prev.frames_decoded, next.frames_decoded);
        self.delta_frames_rendered = counter_delta(prev.frames_rendered, next.frames_rendered);
        self.delta_freeze_count = counter_delta(prev.freeze_count, next.freeze_count);
        self.delta_fec_packets_received =
            counter_delta(prev.fec_packets_received, next.fec_packets_received);
        self.delta_concealed_samples =
            counter_delta(prev.concealed_samples, next.concealed_samples);

        self.stats = next;
        self.interval_advanced = true;
    }

    /// Whether the last `accept` completed a new interval. False when the
    /// snapshot was rejected as stale, so retained deltas are not mistaken
    /// for fresh traffic.
    pub fn interval_advanced(&self) -> bool {
        self.interval_advanced
    }

    /// Wire-shaped projection: the raw snapshot only, no derived state.
    pub fn create_sample(&self) -> InboundRtpStats {
        self.stats.clone()
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.stats.ssrc
    }

    pub fn track_identifier(&self) -> Option<&str> {
        self.stats.track_identifier.as_deref()
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        self.stats.kind
    }

    /// Forward error correction observed this interval.
    pub fn uses_fec(&self) -> bool {
        self.delta_fec_packets_received > 0
    }
}

impl_tracked!(InboundRtpMonitor);

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: f64) -> InboundRtpStats {
        InboundRtpStats {
            id: "IT01".into(),
            timestamp,
            ssrc: Some(1234),
            kind: Some(MediaKind::Audio),
            track_identifier: Some("track-1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_receiving_bitrate_from_byte_delta() {
        // 1000 -> 9000 bytes over one second is 64 kbit/s.
        let mut first = snapshot(0.0);
        first.bytes_received = Some(1_000);
        let mut monitor = InboundRtpMonitor::new(first);

        let mut second = snapshot(1_000.0);
        second.bytes_received = Some(9_000);
        monitor.accept(second);

        assert_eq!(monitor.receiving_bitrate, 64_000.0);
        assert_eq!(monitor.delta_bytes_received, 8_000);
    }

    #[test]
    fn test_stale_snapshot_keeps_derived_fields() {
        let mut first = snapshot(1_000.0);
        first.bytes_received = Some(1_000);
        first.packets_received = Some(100);
        let mut monitor = InboundRtpMonitor::new(first);

        let mut second = snapshot(2_000.0);
        second.bytes_received = Some(2_000);
        second.packets_received = Some(150);
        monitor.accept(second);
        let bitrate_before = monitor.receiving_bitrate;

        // Same timestamp: ignored entirely.
        let mut duplicate = snapshot(2_000.0);
        duplicate.bytes_received = Some(9_999);
        monitor.accept(duplicate);
        assert_eq!(monitor.receiving_bitrate, bitrate_before);
        assert_eq!(monitor.stats.bytes_received, Some(2_000));
        assert!(!monitor.interval_advanced());

        // Older timestamp: also ignored.
        let mut stale = snapshot(500.0);
        stale.bytes_received = Some(0);
        monitor.accept(stale);
        assert_eq!(monitor.stats.bytes_received, Some(2_000));
        assert_eq!(monitor.delta_packets_received, 50);
    }

    #[test]
    fn test_avg_jitter_buffer_delay() {
        let mut first = snapshot(0.0);
        first.jitter_buffer_delay = Some(2.0);
        first.jitter_buffer_emitted_count = Some(100);
        let mut monitor = InboundRtpMonitor::new(first);

        let mut second = snapshot(1_000.0);
        second.jitter_buffer_delay = Some(2.5);
        second.jitter_buffer_emitted_count = Some(150);
        monitor.accept(second);

        // (0.5 s / 50 samples) * 1000 = 10 ms
        assert!((monitor.avg_jitter_buffer_delay_ms - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_buffer_delay_guards_zero_emitted() {
        let mut first = snapshot(0.0);
        first.jitter_buffer_delay = Some(1.0);
        first.jitter_buffer_emitted_count = Some(100);
        let mut monitor = InboundRtpMonitor::new(first);

        let mut second = snapshot(1_000.0);
        second.jitter_buffer_delay = Some(1.2);
        second.jitter_buffer_emitted_count = Some(100);
        monitor.accept(second);

        // Emitted delta clamped to 1 instead of dividing by zero.
        assert!((monitor.avg_jitter_buffer_delay_ms - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_create_sample_is_wire_shaped() {
        let mut first = snapshot(0.0);
        first.bytes_received = Some(500);
        let monitor = InboundRtpMonitor::new(first);
        let sample = monitor.create_sample();
        assert_eq!(sample.bytes_received, Some(500));
        assert_eq!(sample.id, "IT01");
    }
}
