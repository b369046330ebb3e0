//! Entity monitors.
//!
//! One state-holder per tracked entity kind. Each monitor owns the latest
//! accepted wire-shaped snapshot, a `visited` mark consumed by the
//! coordinator's sweep, and the derived fields for the last interval.
//!
//! Derived fields are only recomputed when the incoming snapshot is newer
//! than the held one; a stale, duplicate or out-of-order snapshot is
//! ignored without logging (expected under network jitter) and derived
//! values keep their previous state.

pub mod candidate_pair;
pub mod certificate;
pub mod codec;
pub mod data_channel;
pub mod ice_candidate;
pub mod inbound_rtp;
pub mod media_playout;
pub mod media_source;
pub mod outbound_rtp;
pub mod peer_connection;
pub mod remote_inbound_rtp;
pub mod remote_outbound_rtp;
pub mod transport;

pub use candidate_pair::CandidatePairMonitor;
pub use certificate::CertificateMonitor;
pub use codec::CodecMonitor;
pub use data_channel::DataChannelMonitor;
pub use ice_candidate::IceCandidateMonitor;
pub use inbound_rtp::InboundRtpMonitor;
pub use media_playout::MediaPlayoutMonitor;
pub use media_source::MediaSourceMonitor;
pub use outbound_rtp::OutboundRtpMonitor;
pub use peer_connection::PeerConnectionMonitor;
pub use remote_inbound_rtp::RemoteInboundRtpMonitor;
pub use remote_outbound_rtp::RemoteOutboundRtpMonitor;
pub use transport::TransportMonitor;

/// Mark-and-sweep participation. The coordinator marks a monitor on every
/// successful update and the sweep reads-and-clears the mark in one pass.
pub trait Tracked {
    fn mark_visited(&mut self);
    fn take_visited(&mut self) -> bool;
}

macro_rules! impl_tracked {
    ($monitor:ty) => {
        impl crate::monitors::Tracked for $monitor {
            fn mark_visited(&mut self) {
                self.visited = true;
            }

            fn take_visited(&mut self) -> bool {
                std::mem::take(&mut self.visited)
            }
        }
    };
}
pub(crate) use impl_tracked;

/// Elapsed time between two snapshot timestamps, in seconds, or `None`
/// when the new snapshot is not strictly newer.
pub(crate) fn elapsed_seconds(prev_ms: f64, next_ms: f64) -> Option<f64> {
    let elapsed = (next_ms - prev_ms) / 1000.0;
    (elapsed > 0.0).then_some(elapsed)
}

/// Saturating delta of an optional monotonic counter.
pub(crate) fn counter_delta(prev: Option<u64>, next: Option<u64>) -> u64 {
    match (prev, next) {
        (Some(prev), Some(next)) => next.saturating_sub(prev),
        (None, Some(next)) => next,
        _ => 0,
    }
}

/// Signed delta of an optional counter that may legitimately decrease
/// (packetsLost shrinks when late packets arrive after being counted).
pub(crate) fn signed_delta(prev: Option<i64>, next: Option<i64>) -> i64 {
    match (prev, next) {
        (Some(prev), Some(next)) => next - prev,
        (None, Some(next)) => next,
        _ => 0,
    }
}

/// Bitrate in bits per second from a byte-counter delta.
pub(crate) fn bitrate(delta_bytes: u64, elapsed_secs: f64) -> f64 {
    (delta_bytes as f64 * 8.0) / elapsed_secs
}

/// Fraction lost over one interval: `lost / (lost + received)`, defined
/// as 0 when both are 0. Negative loss deltas count as 0 lost.
pub(crate) fn fraction_lost(delta_lost: i64, delta_received: u64) -> f64 {
    let lost = delta_lost.max(0) as f64;
    let received = delta_received as f64;
    if lost + received == 0.0 {
        0.0
    } else {
        lost / (lost + received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_rejects_non_positive() {
        assert_eq!(elapsed_seconds(1_000.0, 2_000.0), Some(1.0));
        assert_eq!(elapsed_seconds(1_000.0, 1_000.0), None);
        assert_eq!(elapsed_seconds(2_000.0, 1_000.0), None);
    }

    #[test]
    fn test_counter_delta_saturates() {
        assert_eq!(counter_delta(Some(10), Some(15)), 5);
        assert_eq!(counter_delta(Some(20), Some(15)), 0);
        assert_eq!(counter_delta(None, Some(15)), 15);
        assert_eq!(counter_delta(Some(5), None), 0);
    }

    #[test]
    fn test_fraction_lost_edge_cases() {
        assert_eq!(fraction_lost(0, 0), 0.0);
        assert_eq!(fraction_lost(5, 15), 0.25);
        assert_eq!(fraction_lost(-3, 10), 0.0);
    }
}
