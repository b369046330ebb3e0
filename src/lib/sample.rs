//! Wire-shaped samples.
//!
//! A sample is a point-in-time projection of the entity graph: one `Vec`
//! per entity kind holding the monitors' raw snapshots, plus the composed
//! score. The crate only shapes the sample; consumers serialize it with
//! whatever codec they like.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::connection::EntityStores;
use crate::records::{
    CandidatePairStats, CertificateStats, CodecStats, DataChannelStats, IceCandidateStats,
    InboundRtpStats, MediaPlayoutStats, MediaSourceStats, OutboundRtpStats, PeerConnectionStats,
    RemoteInboundRtpStats, RemoteOutboundRtpStats, TransportStats,
};

/// Everything known about one connection at the end of a cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSample {
    pub connection_id: String,
    /// Cycle timestamp in ms, derived from the last accepted batch.
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub codecs: Vec<CodecStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inbound_rtps: Vec<InboundRtpStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub outbound_rtps: Vec<OutboundRtpStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub remote_inbound_rtps: Vec<RemoteInboundRtpStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub remote_outbound_rtps: Vec<RemoteOutboundRtpStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub media_sources: Vec<MediaSourceStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub media_playouts: Vec<MediaPlayoutStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub peer_connections: Vec<PeerConnectionStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub data_channels: Vec<DataChannelStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub transports: Vec<TransportStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub candidate_pairs: Vec<CandidatePairStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub local_candidates: Vec<IceCandidateStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub remote_candidates: Vec<IceCandidateStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub certificates: Vec<CertificateStats>,
}

/// Collect one kind's projections, sorted by id so samples are stable
/// across the hash map iteration order.
fn collect<V, S>(store: &crate::store::EntityStore<V>, project: fn(&V) -> S) -> Vec<S>
where
    S: SampleRecord,
{
    let mut samples: Vec<S> = store.values().map(project).collect();
    samples.sort_by(|a, b| a.sample_id().cmp(b.sample_id()));
    samples
}

trait SampleRecord {
    fn sample_id(&self) -> &str;
}

macro_rules! impl_sample_record {
    ($($stats:ty),+ $(,)?) => {
        $(impl SampleRecord for $stats {
            fn sample_id(&self) -> &str {
                &self.id
            }
        })+
    };
}

impl_sample_record!(
    CodecStats,
    InboundRtpStats,
    OutboundRtpStats,
    RemoteInboundRtpStats,
    RemoteOutboundRtpStats,
    MediaSourceStats,
    MediaPlayoutStats,
    PeerConnectionStats,
    DataChannelStats,
    TransportStats,
    CandidatePairStats,
    IceCandidateStats,
    CertificateStats,
);

impl ConnectionSample {
    pub(crate) fn assemble(
        connection_id: &str,
        timestamp: f64,
        stores: &EntityStores,
        score: Option<f64>,
    ) -> Self {
        Self {
            connection_id: connection_id.to_owned(),
            timestamp,
            score,
            codecs: collect(&stores.codecs, |m| m.create_sample()),
            inbound_rtps: collect(&stores.inbound_rtps, |m| m.create_sample()),
            outbound_rtps: collect(&stores.outbound_rtps, |m| m.create_sample()),
            remote_inbound_rtps: collect(&stores.remote_inbound_rtps, |m| m.create_sample()),
            remote_outbound_rtps: collect(&stores.remote_outbound_rtps, |m| m.create_sample()),
            media_sources: collect(&stores.media_sources, |m| m.create_sample()),
            media_playouts: collect(&stores.media_playouts, |m| m.create_sample()),
            peer_connections: collect(&stores.peer_connections, |m| m.create_sample()),
            data_channels: collect(&stores.data_channels, |m| m.create_sample()),
            transports: collect(&stores.transports, |m| m.create_sample()),
            candidate_pairs: collect(&stores.candidate_pairs, |m| m.create_sample()),
            local_candidates: collect(&stores.local_candidates, |m| m.create_sample()),
            remote_candidates: collect(&stores.remote_candidates, |m| m.create_sample()),
            certificates: collect(&stores.certificates, |m| m.create_sample()),
        }
    }
}

/// All connection samples of one client, in connection-id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ClientSample {
    /// Largest cycle timestamp among the connections, in ms.
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub connections: Vec<ConnectionSample>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::connection::ConnectionCoordinator;
    use crate::records::{MediaKind, RawRecord};

    #[test]
    fn test_sample_holds_wire_snapshots_sorted_by_id() {
        let mut coordinator =
            ConnectionCoordinator::new("conn-1".into(), MonitorConfig::default());
        let batch = ["IT02", "IT01"]
            .iter()
            .map(|id| {
                RawRecord::InboundRtp(InboundRtpStats {
                    id: (*id).into(),
                    timestamp: 1_000.0,
                    ssrc: Some(7),
                    kind: Some(MediaKind::Audio),
                    track_identifier: Some("t".into()),
                    bytes_received: Some(500),
                    ..Default::default()
                })
            })
            .collect();
        coordinator.accept(batch);

        let sample = coordinator.create_sample();
        assert_eq!(sample.connection_id, "conn-1");
        assert_eq!(sample.timestamp, 1_000.0);
        assert_eq!(sample.inbound_rtps.len(), 2);
        assert_eq!(sample.inbound_rtps[0].id, "IT01");
        assert_eq!(sample.inbound_rtps[1].id, "IT02");
        assert!(sample.outbound_rtps.is_empty());
    }

    #[test]
    fn test_sample_serializes_camel_case_and_skips_empty() {
        let sample = ConnectionSample {
            connection_id: "conn-1".into(),
            timestamp: 5.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains(r#""connectionId":"conn-1""#));
        assert!(!json.contains("inboundRtps"));
        assert!(!json.contains("score"));
    }
}
